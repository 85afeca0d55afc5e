//! Group Entity
//!
//! Mid-level grouping inside a collection; the direct parent of items.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::money::Money;

/// A group of items within a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Store-generated identifier (the document's path segment)
    #[serde(skip)]
    pub id: String,
    /// Parent collection, carried by the document path
    #[serde(skip)]
    pub collection_id: String,
    pub owner_id: String,
    pub name: String,
    /// Sum of `value` over the group's items
    pub total_value: Money,
}

impl Group {
    /// Create a new, empty group under a collection. The id is assigned on insert.
    pub fn new(
        collection_id: impl Into<String>,
        owner_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            collection_id: collection_id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            total_value: Money::ZERO,
        }
    }
}

impl Entity for Group {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
