//! In-Memory Document Store
//!
//! A complete `DocumentStore` over a map, used for tests and ephemeral
//! sessions. Documents live in a single `BTreeMap` keyed by full path; a
//! child of `parent` is any key of the form `parent/{id}` with no further
//! separator.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::document::{
    sort_documents, Direction, Document, DocumentStore, Fields, StoreError, StoreResult,
};

pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Fields>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of stored documents, across all levels. Test helper.
    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.lock().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The id of a direct child of `parent`, if `path` is one.
fn child_id<'a>(parent: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(parent)?.strip_prefix('/')?;
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, parent: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let path = format!("{}/{}", parent, id);
        self.docs.lock().await.insert(path, fields);
        Ok(id)
    }

    async fn get(&self, path: &str) -> StoreResult<Option<Fields>> {
        Ok(self.docs.lock().await.get(path).cloned())
    }

    async fn update(&self, path: &str, partial: Fields) -> StoreResult<()> {
        let mut docs = self.docs.lock().await;
        let existing = docs
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        for (key, value) in partial {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.docs.lock().await.remove(path);
        Ok(())
    }

    async fn query_by_equality(
        &self,
        parent: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let docs = self.docs.lock().await;
        Ok(docs
            .iter()
            .filter_map(|(path, fields)| {
                let id = child_id(parent, path)?;
                (fields.get(field) == Some(value)).then(|| Document {
                    id: id.to_string(),
                    fields: fields.clone(),
                })
            })
            .collect())
    }

    async fn query_ordered_by(
        &self,
        parent: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>> {
        let docs = self.docs.lock().await;
        let mut result: Vec<Document> = docs
            .iter()
            .filter_map(|(path, fields)| {
                child_id(parent, path).map(|id| Document {
                    id: id.to_string(),
                    fields: fields.clone(),
                })
            })
            .collect();
        drop(docs);
        sort_documents(&mut result, field, direction);
        Ok(result)
    }
}
