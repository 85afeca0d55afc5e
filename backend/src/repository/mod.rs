//! Repository Layer
//!
//! Typed data access per entity over the document store: entities are
//! serialized into document fields, stamped with their owner, and rebuilt
//! with the ids their document paths carry.

mod collection_repo;
mod group_repo;
mod item_repo;


pub use collection_repo::CollectionRepository;
pub use group_repo::GroupRepository;
pub use item_repo::ItemRepository;

use serde::Serialize;

use crate::domain::{DomainError, DomainResult, Entity};
use crate::store::{Fields, StoreError};

/// Serialize an entity into document fields. Ids are skipped by the entity's
/// serde derives; the document path carries them.
pub(crate) fn document_fields<T: Entity + Serialize>(entity: &T) -> DomainResult<Fields> {
    match serde_json::to_value(entity) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::Store(
            "entity did not serialize to an object".to_string(),
        )),
        Err(e) => Err(DomainError::Store(e.to_string())),
    }
}

/// Translate store-level errors into the domain taxonomy.
pub(crate) fn from_store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound(path) => DomainError::NotFound(path),
        StoreError::Backend(msg) => DomainError::Store(msg),
    }
}
