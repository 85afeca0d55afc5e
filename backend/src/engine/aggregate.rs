//! Aggregate Total Maintenance
//!
//! Two ways to keep the denormalized totals honest: an authoritative
//! recompute from the live children, and an incremental delta applied after
//! a single item mutation. The delta path writes the group first, then
//! propagates the same delta to the collection; the two updates are
//! sequential single-document writes, so a failure in between leaves a
//! drift that the recompute operations repair.

use async_trait::async_trait;

use crate::domain::{DomainResult, Money};

use super::CollectionEngine;

/// Trait for aggregate total operations
#[async_trait]
pub trait AggregateOperations {
    /// Sum the group's live items and write the result to the group's
    /// total. Returns the new total. Authoritative at the instant of the
    /// read; concurrent writers are not isolated against.
    async fn recompute_group_total(
        &self,
        collection_id: &str,
        group_id: &str,
    ) -> DomainResult<Money>;

    /// Sum the collection's group totals and write the result to the
    /// collection's total. Returns the new total.
    async fn recompute_collection_total(&self, collection_id: &str) -> DomainResult<Money>;

    /// Add a signed delta to the group total, then the collection total.
    /// Fails with `NotFound` when either parent document is gone.
    async fn apply_item_delta(
        &self,
        collection_id: &str,
        group_id: &str,
        delta: Money,
    ) -> DomainResult<()>;
}

#[async_trait]
impl AggregateOperations for CollectionEngine {
    async fn recompute_group_total(
        &self,
        collection_id: &str,
        group_id: &str,
    ) -> DomainResult<Money> {
        let owner = self.current_user()?;
        let items = self
            .items
            .list_for_group(&owner, collection_id, group_id)
            .await?;
        let total = items
            .iter()
            .fold(Money::ZERO, |acc, item| acc.plus(item.value));

        self.groups.set_total(collection_id, group_id, total).await?;
        log::debug!("recomputed group {} total to {}", group_id, total);
        Ok(total)
    }

    async fn recompute_collection_total(&self, collection_id: &str) -> DomainResult<Money> {
        let owner = self.current_user()?;
        let groups = self.groups.list(&owner, collection_id).await?;
        let total = groups
            .iter()
            .fold(Money::ZERO, |acc, group| acc.plus(group.total_value));

        self.collections.set_total(collection_id, total).await?;
        log::debug!("recomputed collection {} total to {}", collection_id, total);
        Ok(total)
    }

    async fn apply_item_delta(
        &self,
        collection_id: &str,
        group_id: &str,
        delta: Money,
    ) -> DomainResult<()> {
        let owner = self.current_user()?;

        // Group first, collection second; read-modify-write per document.
        let group = self.groups.require(&owner, collection_id, group_id).await?;
        self.groups
            .set_total(collection_id, group_id, group.total_value.plus(delta))
            .await?;

        let collection = self.collections.require(&owner, collection_id).await?;
        self.collections
            .set_total(collection_id, collection.total_value.plus(delta))
            .await?;

        Ok(())
    }
}
