//! Minha Coleção Backend
//!
//! Layered architecture:
//! - domain: Core entities, monetary values and business rules
//! - store: Document-store collaborator (in-memory and libsql adapters)
//! - repository: Data access per entity, owner-scoped
//! - engine: Aggregate maintenance and the caller-facing operations
//! - auth: Identity provider collaborator

pub mod auth;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod store;

pub use auth::{FixedIdentity, IdentityProvider, Session, UserId};
pub use domain::{Collection, DomainError, DomainResult, Group, Item, Money};
pub use engine::{
    AggregateOperations, CascadeOperations, CollectionEngine, ItemInput, ItemOperations,
};

use std::path::Path;
use std::sync::Arc;

use store::{init_db, DocumentStore, MemoryStore};

/// One running backend instance: a session plus the engine wired to a store.
pub struct App {
    pub session: Arc<Session>,
    pub engine: CollectionEngine,
}

impl App {
    /// Backend over an ephemeral in-memory store.
    pub fn in_memory() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        Self::with_store(store)
    }

    /// Backend over a libsql database at `db_path`, created on first use.
    pub async fn open(db_path: &Path) -> DomainResult<Self> {
        let store = init_db(db_path)
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(Self::with_store(Arc::new(store)))
    }

    fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let session = Arc::new(Session::new());
        let engine = CollectionEngine::new(store, session.clone());
        Self { session, engine }
    }
}
