//! Item Repository
//!
//! Handles all item-level document access. Items live two levels deep
//! (`collections/{c}/groups/{g}/items/{i}`); both parent ids come from the
//! path.

use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, Item};
use crate::store::{path, Direction, DocumentStore, Fields};

use super::{document_fields, from_store_error};

pub struct ItemRepository {
    store: Arc<dyn DocumentStore>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist a new item under its group; returns it with the
    /// store-assigned id.
    pub async fn create(&self, entity: &Item) -> DomainResult<Item> {
        let fields = document_fields(entity)?;
        let id = self
            .store
            .insert(&path::items(&entity.collection_id, &entity.group_id), fields)
            .await
            .map_err(from_store_error)?;

        let mut item = entity.clone();
        item.id = id;
        Ok(item)
    }

    /// Fetch one item, treating another owner's document as absent.
    pub async fn find_by_id(
        &self,
        owner: &str,
        collection_id: &str,
        group_id: &str,
        id: &str,
    ) -> DomainResult<Option<Item>> {
        let fields = self
            .store
            .get(&path::item(collection_id, group_id, id))
            .await
            .map_err(from_store_error)?;
        match fields {
            Some(fields) => {
                let item = fields_to_item(collection_id, group_id, id, fields)?;
                Ok((item.owner_id == owner).then_some(item))
            }
            None => Ok(None),
        }
    }

    /// All of a group's items belonging to `owner`, newest first.
    pub async fn list_for_group(
        &self,
        owner: &str,
        collection_id: &str,
        group_id: &str,
    ) -> DomainResult<Vec<Item>> {
        let docs = self
            .store
            .query_ordered_by(
                &path::items(collection_id, group_id),
                "created_at",
                Direction::Descending,
            )
            .await
            .map_err(from_store_error)?;

        let mut items = Vec::new();
        for doc in docs {
            let item = fields_to_item(collection_id, group_id, &doc.id, doc.fields)?;
            if item.owner_id == owner {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Overwrite an existing item's fields. Fails with `NotFound` when the
    /// document vanished in the meantime.
    pub async fn update(&self, entity: &Item) -> DomainResult<Item> {
        let fields = document_fields(entity)?;
        self.store
            .update(
                &path::item(&entity.collection_id, &entity.group_id, &entity.id),
                fields,
            )
            .await
            .map_err(from_store_error)?;
        Ok(entity.clone())
    }

    /// Delete the item document. Safe to retry; deleting an absent document
    /// is a no-op at the store level.
    pub async fn delete(&self, entity: &Item) -> DomainResult<()> {
        self.store
            .delete(&path::item(
                &entity.collection_id,
                &entity.group_id,
                &entity.id,
            ))
            .await
            .map_err(from_store_error)
    }
}

/// Convert document fields to an Item
fn fields_to_item(
    collection_id: &str,
    group_id: &str,
    id: &str,
    fields: Fields,
) -> DomainResult<Item> {
    let mut item: Item = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| DomainError::Store(format!("corrupt item {}: {}", id, e)))?;
    item.id = id.to_string();
    item.collection_id = collection_id.to_string();
    item.group_id = group_id.to_string();
    Ok(item)
}
