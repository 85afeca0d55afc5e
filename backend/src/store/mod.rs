//! Store Layer
//!
//! The document-store collaborator: a path-addressed trait plus the
//! in-memory and libsql adapters. Everything above this layer is
//! backend-agnostic.

mod db;
mod document;
mod memory;
pub mod path;

pub use db::{init_db, LibsqlStore};
pub use document::{Direction, Document, DocumentStore, Fields, StoreError, StoreResult};
pub use memory::MemoryStore;
