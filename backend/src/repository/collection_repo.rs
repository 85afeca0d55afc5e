//! Collection Repository
//!
//! Handles all collection-level document access.

use std::sync::Arc;

use crate::domain::{Collection, DomainError, DomainResult, Money};
use crate::store::{path, Document, DocumentStore, Fields};

use super::{document_fields, from_store_error};

pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
}

impl CollectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new collection; returns it with the store-assigned id.
    pub async fn create(&self, entity: &Collection) -> DomainResult<Collection> {
        let fields = document_fields(entity)?;
        let id = self
            .store
            .insert(path::COLLECTIONS, fields)
            .await
            .map_err(from_store_error)?;

        let mut collection = entity.clone();
        collection.id = id;
        Ok(collection)
    }

    /// Fetch one collection. A document owned by someone else is reported
    /// as absent, never returned.
    pub async fn find_by_id(&self, owner: &str, id: &str) -> DomainResult<Option<Collection>> {
        let fields = self
            .store
            .get(&path::collection(id))
            .await
            .map_err(from_store_error)?;
        match fields {
            Some(fields) => {
                let collection = fields_to_collection(id, fields)?;
                Ok((collection.owner_id == owner).then_some(collection))
            }
            None => Ok(None),
        }
    }

    /// Like `find_by_id`, but absence is an error.
    pub async fn require(&self, owner: &str, id: &str) -> DomainResult<Collection> {
        self.find_by_id(owner, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("collection {}", id)))
    }

    /// All collections belonging to `owner`.
    pub async fn list(&self, owner: &str) -> DomainResult<Vec<Collection>> {
        let docs = self
            .store
            .query_by_equality(path::COLLECTIONS, "owner_id", &serde_json::Value::from(owner))
            .await
            .map_err(from_store_error)?;
        docs.into_iter()
            .map(|Document { id, fields }| fields_to_collection(&id, fields))
            .collect()
    }

    /// Overwrite the denormalized total. Single-field merge update.
    pub async fn set_total(&self, id: &str, total: Money) -> DomainResult<()> {
        let mut partial = Fields::new();
        let encoded = serde_json::to_value(total).map_err(|e| DomainError::Store(e.to_string()))?;
        partial.insert("total_value".to_string(), encoded);
        self.store
            .update(&path::collection(id), partial)
            .await
            .map_err(from_store_error)
    }

    /// Delete the collection document. Child groups are the caller's job.
    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        self.store
            .delete(&path::collection(id))
            .await
            .map_err(from_store_error)
    }
}

/// Convert document fields to a Collection
fn fields_to_collection(id: &str, fields: Fields) -> DomainResult<Collection> {
    let mut collection: Collection = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| DomainError::Store(format!("corrupt collection {}: {}", id, e)))?;
    collection.id = id.to_string();
    Ok(collection)
}
