//! Item Entity
//!
//! Leaf of the hierarchy and the unit of aggregation: every item carries a
//! positive monetary value that rolls up into its group's and collection's
//! totals.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::money::Money;

/// A single collected item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-generated identifier (the document's path segment)
    #[serde(skip)]
    pub id: String,
    /// Grandparent collection, carried by the document path
    #[serde(skip)]
    pub collection_id: String,
    /// Parent group, carried by the document path
    #[serde(skip)]
    pub group_id: String,
    pub owner_id: String,
    pub name: String,
    pub details: Option<String>,
    pub acquisition_date: Option<String>,
    /// Positive amount, two fractional digits
    pub value: Money,
    /// Creation instant, epoch milliseconds; item lists are newest-first
    pub created_at: i64,
}

impl Item {
    /// Create a new item under a group, stamped with the current instant.
    /// The id is assigned on insert.
    pub fn new(
        collection_id: impl Into<String>,
        group_id: impl Into<String>,
        owner_id: impl Into<String>,
        name: impl Into<String>,
        details: Option<String>,
        acquisition_date: Option<String>,
        value: Money,
    ) -> Self {
        Self {
            id: String::new(),
            collection_id: collection_id.into(),
            group_id: group_id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            details,
            acquisition_date,
            value,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl Entity for Item {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
