//! Item Operations
//!
//! Create, edit and delete items, keeping the parent totals in step via
//! `apply_item_delta`. All input is validated before the first write; the
//! item write itself comes before any total update, so a failed total
//! update surfaces as an error while the item is already persisted (the
//! recompute operations close that gap).

use async_trait::async_trait;

use crate::domain::{DomainError, DomainResult, Item, Money};

use super::aggregate::AggregateOperations;
use super::{validate_name, CollectionEngine};

/// Raw user input for creating or editing an item. The value arrives as
/// text exactly as typed; both `.` and `,` decimal separators are accepted.
#[derive(Debug, Clone, Default)]
pub struct ItemInput {
    pub name: String,
    pub details: Option<String>,
    pub acquisition_date: Option<String>,
    pub value: String,
}

/// Trait for item lifecycle operations
#[async_trait]
pub trait ItemOperations {
    /// Validate, persist the item, then add its value to the parent totals.
    async fn create_item(
        &self,
        collection_id: &str,
        group_id: &str,
        input: ItemInput,
    ) -> DomainResult<Item>;

    /// Validate, persist the changed item, then apply the signed value
    /// difference to the parent totals.
    async fn edit_item(&self, item: &Item, input: ItemInput) -> DomainResult<Item>;

    /// Remove the item, then subtract its value from the parent totals.
    async fn delete_item(&self, item: &Item) -> DomainResult<()>;

    /// The group's items, newest first.
    async fn list_items(&self, collection_id: &str, group_id: &str) -> DomainResult<Vec<Item>>;
}

#[async_trait]
impl ItemOperations for CollectionEngine {
    async fn create_item(
        &self,
        collection_id: &str,
        group_id: &str,
        input: ItemInput,
    ) -> DomainResult<Item> {
        let owner = self.current_user()?;
        let (name, details, acquisition_date, value) = validate_item_input(input)?;

        let item = Item::new(
            collection_id,
            group_id,
            owner,
            name,
            details,
            acquisition_date,
            value,
        );
        let created = self.items.create(&item).await?;

        self.apply_item_delta(collection_id, group_id, value).await?;
        Ok(created)
    }

    async fn edit_item(&self, item: &Item, input: ItemInput) -> DomainResult<Item> {
        self.current_user()?;
        let (name, details, acquisition_date, value) = validate_item_input(input)?;

        let mut updated = item.clone();
        updated.name = name;
        updated.details = details;
        updated.acquisition_date = acquisition_date;
        updated.value = value;
        let updated = self.items.update(&updated).await?;

        let diff = value.minus(item.value);
        self.apply_item_delta(&item.collection_id, &item.group_id, diff)
            .await?;
        Ok(updated)
    }

    async fn delete_item(&self, item: &Item) -> DomainResult<()> {
        self.current_user()?;
        self.items.delete(item).await?;
        self.apply_item_delta(&item.collection_id, &item.group_id, item.value.negated())
            .await
    }

    async fn list_items(&self, collection_id: &str, group_id: &str) -> DomainResult<Vec<Item>> {
        let owner = self.current_user()?;
        self.items
            .list_for_group(&owner, collection_id, group_id)
            .await
    }
}

/// Normalize and validate raw item input. Nothing is written when this
/// fails. Blank optional fields become absent rather than placeholder text.
fn validate_item_input(
    input: ItemInput,
) -> DomainResult<(String, Option<String>, Option<String>, Money)> {
    let name = validate_name(&input.name, "item name")?;
    let value = Money::parse(&input.value)?;
    if !value.is_positive() {
        return Err(DomainError::Validation(
            "item value must be greater than zero".to_string(),
        ));
    }
    let details = input.details.filter(|s| !s.trim().is_empty());
    let acquisition_date = input.acquisition_date.filter(|s| !s.trim().is_empty());
    Ok((name, details, acquisition_date, value))
}
