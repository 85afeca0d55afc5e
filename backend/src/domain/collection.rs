//! Collection Entity
//!
//! Top-level grouping owned by a user. Carries the denormalized sum of its
//! groups' totals so the list screen never has to walk the hierarchy.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::money::Money;

/// A top-level collection ("Hqs e Mangás", "Vinis", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Store-generated identifier (the document's path segment)
    #[serde(skip)]
    pub id: String,
    /// Owning user; reads are filtered by this
    pub owner_id: String,
    pub name: String,
    /// Sum of `total_value` over the collection's groups
    pub total_value: Money,
}

impl Collection {
    /// Create a new, empty collection. The id is assigned on insert.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            total_value: Money::ZERO,
        }
    }
}

impl Entity for Collection {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_starts_empty() {
        let c = Collection::new("user-1", "Vinis");
        assert!(c.id.is_empty());
        assert_eq!(c.owner_id, "user-1");
        assert_eq!(c.total_value, Money::ZERO);
    }

    #[test]
    fn test_id_is_not_serialized() {
        let mut c = Collection::new("user-1", "Vinis");
        c.id = "abc123".to_string();
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["owner_id"], "user-1");
    }
}
