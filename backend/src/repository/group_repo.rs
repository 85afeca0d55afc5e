//! Group Repository
//!
//! Handles all group-level document access. Groups live under their
//! collection's path; the collection id never appears in the fields.

use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, Group, Money};
use crate::store::{path, Document, DocumentStore, Fields};

use super::{document_fields, from_store_error};

pub struct GroupRepository {
    store: Arc<dyn DocumentStore>,
}

impl GroupRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new group under its collection; returns it with the
    /// store-assigned id.
    pub async fn create(&self, entity: &Group) -> DomainResult<Group> {
        let fields = document_fields(entity)?;
        let id = self
            .store
            .insert(&path::groups(&entity.collection_id), fields)
            .await
            .map_err(from_store_error)?;

        let mut group = entity.clone();
        group.id = id;
        Ok(group)
    }

    /// Fetch one group, treating another owner's document as absent.
    pub async fn find_by_id(
        &self,
        owner: &str,
        collection_id: &str,
        id: &str,
    ) -> DomainResult<Option<Group>> {
        let fields = self
            .store
            .get(&path::group(collection_id, id))
            .await
            .map_err(from_store_error)?;
        match fields {
            Some(fields) => {
                let group = fields_to_group(collection_id, id, fields)?;
                Ok((group.owner_id == owner).then_some(group))
            }
            None => Ok(None),
        }
    }

    /// Like `find_by_id`, but absence is an error.
    pub async fn require(&self, owner: &str, collection_id: &str, id: &str) -> DomainResult<Group> {
        self.find_by_id(owner, collection_id, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("group {}", id)))
    }

    /// All groups of a collection belonging to `owner`.
    pub async fn list(&self, owner: &str, collection_id: &str) -> DomainResult<Vec<Group>> {
        let docs = self
            .store
            .query_by_equality(
                &path::groups(collection_id),
                "owner_id",
                &serde_json::Value::from(owner),
            )
            .await
            .map_err(from_store_error)?;
        docs.into_iter()
            .map(|Document { id, fields }| fields_to_group(collection_id, &id, fields))
            .collect()
    }

    /// Overwrite the denormalized total. Single-field merge update.
    pub async fn set_total(&self, collection_id: &str, id: &str, total: Money) -> DomainResult<()> {
        let mut partial = Fields::new();
        let encoded = serde_json::to_value(total).map_err(|e| DomainError::Store(e.to_string()))?;
        partial.insert("total_value".to_string(), encoded);
        self.store
            .update(&path::group(collection_id, id), partial)
            .await
            .map_err(from_store_error)
    }

    /// Delete the group document. Child items are the caller's job.
    pub async fn delete(&self, collection_id: &str, id: &str) -> DomainResult<()> {
        self.store
            .delete(&path::group(collection_id, id))
            .await
            .map_err(from_store_error)
    }
}

/// Convert document fields to a Group
fn fields_to_group(collection_id: &str, id: &str, fields: Fields) -> DomainResult<Group> {
    let mut group: Group = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| DomainError::Store(format!("corrupt group {}: {}", id, e)))?;
    group.id = id.to_string();
    group.collection_id = collection_id.to_string();
    Ok(group)
}
