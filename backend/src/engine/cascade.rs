//! Cascade Deletion
//!
//! Deleting a group removes every item under it, removes the group
//! document, and subtracts the group's pre-deletion total from the
//! collection. Deleting a collection cascades that over every group.
//!
//! The item deletes run one by one and are idempotent, so a cascade that
//! fails partway can simply be re-run: already-deleted documents are
//! skipped and the remaining ones picked up. The collection-total
//! subtraction happens only after every delete succeeded.

use async_trait::async_trait;

use crate::domain::{Collection, DomainResult, Group};

use super::CollectionEngine;

/// Trait for cascade deletion operations
#[async_trait]
pub trait CascadeOperations {
    /// Delete a group with all its items, then subtract the group's
    /// pre-deletion total from the collection total.
    async fn delete_group(&self, group: &Group) -> DomainResult<()>;

    /// Delete a collection by cascading `delete_group` over every group,
    /// then deleting the collection document itself.
    async fn delete_collection(&self, collection: &Collection) -> DomainResult<()>;
}

#[async_trait]
impl CascadeOperations for CollectionEngine {
    async fn delete_group(&self, group: &Group) -> DomainResult<()> {
        let owner = self.current_user()?;

        let items = self
            .items
            .list_for_group(&owner, &group.collection_id, &group.id)
            .await?;
        for item in &items {
            if let Err(e) = self.items.delete(item).await {
                log::warn!(
                    "cascade delete of group {} halted at item {}: {}",
                    group.id,
                    item.id,
                    e
                );
                return Err(e);
            }
        }

        self.groups.delete(&group.collection_id, &group.id).await?;

        // The group's stored total is subtracted, not a fresh sum: the items
        // are already gone, and the caller holds the pre-deletion snapshot.
        let collection = self
            .collections
            .require(&owner, &group.collection_id)
            .await?;
        self.collections
            .set_total(
                &group.collection_id,
                collection.total_value.minus(group.total_value),
            )
            .await
    }

    async fn delete_collection(&self, collection: &Collection) -> DomainResult<()> {
        let owner = self.current_user()?;

        let groups = self.groups.list(&owner, &collection.id).await?;
        for group in &groups {
            self.delete_group(group).await?;
        }

        self.collections.delete(&collection.id).await
    }
}
