//! Aggregate Maintenance Engine
//!
//! The caller-facing layer. Owns the repositories and the acting identity,
//! and keeps the denormalized totals consistent with the live items:
//! - aggregate: recompute and incremental-delta maintenance
//! - item_ops: item create/edit/delete with validation before any write
//! - cascade: group and collection deletion, idempotent and retryable
//!
//! There is no cross-call isolation; within one call, writes follow the
//! documented sequence (item, then group total, then collection total).

mod aggregate;
mod cascade;
mod item_ops;

#[cfg(test)]
mod tests;

pub use aggregate::AggregateOperations;
pub use cascade::CascadeOperations;
pub use item_ops::{ItemInput, ItemOperations};

use std::sync::Arc;

use crate::auth::{IdentityProvider, UserId};
use crate::domain::{Collection, DomainError, DomainResult, Group};
use crate::repository::{CollectionRepository, GroupRepository, ItemRepository};
use crate::store::DocumentStore;

pub struct CollectionEngine {
    pub(crate) collections: CollectionRepository,
    pub(crate) groups: GroupRepository,
    pub(crate) items: ItemRepository,
    pub(crate) identity: Arc<dyn IdentityProvider>,
}

impl CollectionEngine {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            collections: CollectionRepository::new(store.clone()),
            groups: GroupRepository::new(store.clone()),
            items: ItemRepository::new(store),
            identity,
        }
    }

    pub(crate) fn current_user(&self) -> DomainResult<UserId> {
        self.identity.current_user_id()
    }

    /// Create an empty collection owned by the acting user.
    pub async fn create_collection(&self, name: &str) -> DomainResult<Collection> {
        let owner = self.current_user()?;
        let name = validate_name(name, "collection name")?;
        self.collections.create(&Collection::new(owner, name)).await
    }

    /// The acting user's collections.
    pub async fn list_collections(&self) -> DomainResult<Vec<Collection>> {
        let owner = self.current_user()?;
        self.collections.list(&owner).await
    }

    /// Create an empty group under a collection.
    pub async fn create_group(&self, collection_id: &str, name: &str) -> DomainResult<Group> {
        let owner = self.current_user()?;
        let name = validate_name(name, "group name")?;
        self.groups
            .create(&Group::new(collection_id, owner, name))
            .await
    }

    /// The acting user's groups within a collection.
    pub async fn list_groups(&self, collection_id: &str) -> DomainResult<Vec<Group>> {
        let owner = self.current_user()?;
        self.groups.list(&owner, collection_id).await
    }
}

/// Reject blank names before anything is written.
pub(crate) fn validate_name(name: &str, what: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}
