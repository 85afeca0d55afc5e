//! Document Paths
//!
//! Builders for the three-level hierarchy:
//! `collections/{id}/groups/{id}/items/{id}`.

/// Root segment for all collections
pub const COLLECTIONS: &str = "collections";

pub fn collection(collection_id: &str) -> String {
    format!("{}/{}", COLLECTIONS, collection_id)
}

pub fn groups(collection_id: &str) -> String {
    format!("{}/groups", collection(collection_id))
}

pub fn group(collection_id: &str, group_id: &str) -> String {
    format!("{}/{}", groups(collection_id), group_id)
}

pub fn items(collection_id: &str, group_id: &str) -> String {
    format!("{}/items", group(collection_id, group_id))
}

pub fn item(collection_id: &str, group_id: &str, item_id: &str) -> String {
    format!("{}/{}", items(collection_id, group_id), item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_nest() {
        assert_eq!(collection("c1"), "collections/c1");
        assert_eq!(group("c1", "g1"), "collections/c1/groups/g1");
        assert_eq!(item("c1", "g1", "i1"), "collections/c1/groups/g1/items/i1");
    }
}
