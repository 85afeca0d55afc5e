//! Engine Integration Tests
//!
//! The full item lifecycle against the in-memory store, including the
//! failure modes the totals logic has to survive: injected store failures,
//! partial cascades, and drifted totals repaired by recompute.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::FixedIdentity;
use crate::domain::{DomainError, Money};
use crate::store::{
    path, Direction, Document, DocumentStore, Fields, MemoryStore, StoreError, StoreResult,
};
use crate::App;

use super::{AggregateOperations, CascadeOperations, CollectionEngine, ItemInput, ItemOperations};

fn input(name: &str, value: &str) -> ItemInput {
    ItemInput {
        name: name.to_string(),
        value: value.to_string(),
        ..Default::default()
    }
}

fn signed_in_app() -> App {
    let app = App::in_memory();
    app.session.sign_in("user-1");
    app
}

async fn group_total(engine: &CollectionEngine, collection_id: &str, group_id: &str) -> Money {
    engine
        .list_groups(collection_id)
        .await
        .unwrap()
        .into_iter()
        .find(|g| g.id == group_id)
        .expect("group should exist")
        .total_value
}

async fn collection_total(engine: &CollectionEngine, collection_id: &str) -> Money {
    engine
        .list_collections()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.id == collection_id)
        .expect("collection should exist")
        .total_value
}

#[tokio::test]
async fn test_totals_follow_item_lifecycle() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Hqs e Mangás").await.unwrap();
    let group = engine.create_group(&collection.id, "Mangás").await.unwrap();
    assert_eq!(group.total_value, Money::ZERO);

    // create A (10.00)
    let a = engine
        .create_item(&collection.id, &group.id, input("Item A", "10.00"))
        .await
        .unwrap();
    assert_eq!(group_total(engine, &collection.id, &group.id).await.to_string(), "10.00");
    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "10.00");

    // create B (5.50), comma separator
    let b = engine
        .create_item(&collection.id, &group.id, input("Item B", "5,50"))
        .await
        .unwrap();
    assert_eq!(b.value.to_string(), "5.50");
    assert_eq!(group_total(engine, &collection.id, &group.id).await.to_string(), "15.50");

    // edit A to 20.00, diff +10.00
    let a = engine.edit_item(&a, input("Item A", "20.00")).await.unwrap();
    assert_eq!(a.value.to_string(), "20.00");
    assert_eq!(group_total(engine, &collection.id, &group.id).await.to_string(), "25.50");
    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "25.50");

    // delete B
    engine.delete_item(&b).await.unwrap();
    assert_eq!(group_total(engine, &collection.id, &group.id).await.to_string(), "20.00");

    // delete the group: items are gone and the collection drops by exactly
    // the group's pre-deletion total
    let group = engine
        .list_groups(&collection.id)
        .await
        .unwrap()
        .into_iter()
        .find(|g| g.id == group.id)
        .unwrap();
    engine.delete_group(&group).await.unwrap();

    assert!(engine.list_groups(&collection.id).await.unwrap().is_empty());
    assert!(engine
        .list_items(&collection.id, &group.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "0.00");
}

#[tokio::test]
async fn test_edit_to_smaller_value_applies_negative_diff() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Moedas").await.unwrap();
    let group = engine.create_group(&collection.id, "Réis").await.unwrap();
    let item = engine
        .create_item(&collection.id, &group.id, input("960 réis", "20.00"))
        .await
        .unwrap();

    engine.edit_item(&item, input("960 réis", "7,25")).await.unwrap();
    assert_eq!(group_total(engine, &collection.id, &group.id).await.to_string(), "7.25");
    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "7.25");
}

#[tokio::test]
async fn test_validation_rejects_bad_input_without_writing() {
    let store = Arc::new(MemoryStore::new());
    let engine = CollectionEngine::new(store.clone(), Arc::new(FixedIdentity::new("user-1")));

    let collection = engine.create_collection("Selos").await.unwrap();
    let group = engine.create_group(&collection.id, "Brasil").await.unwrap();
    let docs_before = store.len().await;

    for bad_value in ["0", "-5", "", "abc"] {
        let err = engine
            .create_item(&collection.id, &group.id, input("Selo raro", bad_value))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::Validation(_)),
            "value {:?} should be rejected",
            bad_value
        );
    }
    let err = engine
        .create_item(&collection.id, &group.id, input("   ", "10.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    // nothing was written and the totals never moved
    assert_eq!(store.len().await, docs_before);
    assert_eq!(group_total(&engine, &collection.id, &group.id).await, Money::ZERO);

    // blank names for the containers are rejected the same way
    assert!(matches!(
        engine.create_collection("  ").await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        engine.create_group(&collection.id, "").await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_recompute_matches_ground_truth_after_mixed_operations() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Vinis").await.unwrap();
    let group = engine.create_group(&collection.id, "MPB").await.unwrap();

    let first = engine
        .create_item(&collection.id, &group.id, input("Elis & Tom", "120,00"))
        .await
        .unwrap();
    engine
        .create_item(&collection.id, &group.id, input("Clube da Esquina", "85.50"))
        .await
        .unwrap();
    let edited = engine
        .edit_item(&first, input("Elis & Tom", "150.00"))
        .await
        .unwrap();
    engine.delete_item(&edited).await.unwrap();

    // incremental deltas and the authoritative recompute agree
    let expected = Money::parse("85.50").unwrap();
    assert_eq!(group_total(engine, &collection.id, &group.id).await, expected);
    let recomputed = engine
        .recompute_group_total(&collection.id, &group.id)
        .await
        .unwrap();
    assert_eq!(recomputed, expected);

    // and recompute is idempotent without intervening writes
    let again = engine
        .recompute_group_total(&collection.id, &group.id)
        .await
        .unwrap();
    assert_eq!(again, recomputed);

    let collection_recomputed = engine
        .recompute_collection_total(&collection.id)
        .await
        .unwrap();
    assert_eq!(collection_recomputed, expected);
}

#[tokio::test]
async fn test_collection_total_spans_groups() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Hqs").await.unwrap();
    let g1 = engine.create_group(&collection.id, "Nacionais").await.unwrap();
    let g2 = engine.create_group(&collection.id, "Importadas").await.unwrap();

    engine
        .create_item(&collection.id, &g1.id, input("Turma da Mônica 1", "8,00"))
        .await
        .unwrap();
    engine
        .create_item(&collection.id, &g2.id, input("Watchmen", "60.00"))
        .await
        .unwrap();

    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "68.00");

    // deleting one group leaves the sibling untouched
    let g1 = engine
        .list_groups(&collection.id)
        .await
        .unwrap()
        .into_iter()
        .find(|g| g.id == g1.id)
        .unwrap();
    engine.delete_group(&g1).await.unwrap();
    assert_eq!(collection_total(engine, &collection.id).await.to_string(), "60.00");
    assert_eq!(group_total(engine, &collection.id, &g2.id).await.to_string(), "60.00");
}

#[tokio::test]
async fn test_delete_collection_cascades_everything() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Tudo").await.unwrap();
    for group_name in ["A", "B"] {
        let group = engine.create_group(&collection.id, group_name).await.unwrap();
        for i in 1..=3 {
            engine
                .create_item(
                    &collection.id,
                    &group.id,
                    input(&format!("{} item {}", group_name, i), "10.00"),
                )
                .await
                .unwrap();
        }
    }

    let collection = engine
        .list_collections()
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.id == collection.id)
        .unwrap();
    assert_eq!(collection.total_value.to_string(), "60.00");

    engine.delete_collection(&collection).await.unwrap();
    assert!(engine.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_scoping_hides_foreign_documents() {
    let app = App::in_memory();
    let engine = &app.engine;

    app.session.sign_in("alice");
    let collection = engine.create_collection("Discos da Alice").await.unwrap();
    let group = engine.create_group(&collection.id, "Jazz").await.unwrap();
    engine
        .create_item(&collection.id, &group.id, input("Kind of Blue", "90.00"))
        .await
        .unwrap();

    app.session.sign_in("bob");
    assert!(engine.list_collections().await.unwrap().is_empty());
    assert!(engine.list_groups(&collection.id).await.unwrap().is_empty());
    assert!(engine
        .list_items(&collection.id, &group.id)
        .await
        .unwrap()
        .is_empty());
    // a foreign parent is simply not there for bob
    let err = engine
        .create_item(&collection.id, &group.id, input("Intruso", "1.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    app.session.sign_in("alice");
    assert_eq!(engine.list_collections().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_operations_require_a_signed_in_user() {
    let app = App::in_memory();
    assert!(matches!(
        app.engine.create_collection("Sem dono").await,
        Err(DomainError::Unauthenticated)
    ));
    assert!(matches!(
        app.engine.list_collections().await,
        Err(DomainError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_create_into_deleted_group_is_not_found() {
    let app = signed_in_app();
    let engine = &app.engine;

    let collection = engine.create_collection("Vinis").await.unwrap();
    let group = engine.create_group(&collection.id, "Samba").await.unwrap();
    engine.delete_group(&group).await.unwrap();

    let err = engine
        .create_item(&collection.id, &group.id, input("Cartola", "50.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

/// Store wrapper that fails selected operations exactly once, to exercise
/// the gaps between sequential writes.
struct FailingStore {
    inner: MemoryStore,
    fail_update_once: StdMutex<HashSet<String>>,
    fail_delete_once: StdMutex<HashSet<String>>,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_update_once: StdMutex::new(HashSet::new()),
            fail_delete_once: StdMutex::new(HashSet::new()),
        }
    }

    fn fail_next_update(&self, path: &str) {
        self.fail_update_once
            .lock()
            .unwrap()
            .insert(path.to_string());
    }

    fn fail_next_delete(&self, path: &str) {
        self.fail_delete_once
            .lock()
            .unwrap()
            .insert(path.to_string());
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, parent: &str, fields: Fields) -> StoreResult<String> {
        self.inner.insert(parent, fields).await
    }

    async fn get(&self, path: &str) -> StoreResult<Option<Fields>> {
        self.inner.get(path).await
    }

    async fn update(&self, path: &str, partial: Fields) -> StoreResult<()> {
        if self.fail_update_once.lock().unwrap().remove(path) {
            return Err(StoreError::Backend("injected update failure".to_string()));
        }
        self.inner.update(path, partial).await
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        if self.fail_delete_once.lock().unwrap().remove(path) {
            return Err(StoreError::Backend("injected delete failure".to_string()));
        }
        self.inner.delete(path).await
    }

    async fn query_by_equality(
        &self,
        parent: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        self.inner.query_by_equality(parent, field, value).await
    }

    async fn query_ordered_by(
        &self,
        parent: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>> {
        self.inner.query_ordered_by(parent, field, direction).await
    }
}

#[tokio::test]
async fn test_failed_collection_update_drifts_and_recompute_repairs() {
    let store = Arc::new(FailingStore::new());
    let engine = CollectionEngine::new(store.clone(), Arc::new(FixedIdentity::new("user-1")));

    let collection = engine.create_collection("Vinis").await.unwrap();
    let group = engine.create_group(&collection.id, "Bossa").await.unwrap();

    // the group-total write lands, the collection-total write does not
    store.fail_next_update(&path::collection(&collection.id));
    let err = engine
        .create_item(&collection.id, &group.id, input("Getz/Gilberto", "10.00"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Store(_)));

    assert_eq!(group_total(&engine, &collection.id, &group.id).await.to_string(), "10.00");
    assert_eq!(collection_total(&engine, &collection.id).await.to_string(), "0.00");

    // the authoritative pass closes the gap
    let repaired = engine
        .recompute_collection_total(&collection.id)
        .await
        .unwrap();
    assert_eq!(repaired.to_string(), "10.00");
    assert_eq!(collection_total(&engine, &collection.id).await.to_string(), "10.00");
}

#[tokio::test]
async fn test_interrupted_cascade_can_be_rerun() {
    let store = Arc::new(FailingStore::new());
    let engine = CollectionEngine::new(store.clone(), Arc::new(FixedIdentity::new("user-1")));

    let collection = engine.create_collection("Hqs").await.unwrap();
    let group = engine.create_group(&collection.id, "Mangás").await.unwrap();
    for i in 1..=3 {
        engine
            .create_item(&collection.id, &group.id, input(&format!("Vol. {}", i), "10.00"))
            .await
            .unwrap();
    }

    let group = engine
        .list_groups(&collection.id)
        .await
        .unwrap()
        .into_iter()
        .find(|g| g.id == group.id)
        .unwrap();
    assert_eq!(group.total_value.to_string(), "30.00");

    // first run halts on one item; already-issued deletes stand
    let items = engine.list_items(&collection.id, &group.id).await.unwrap();
    let victim = &items[1];
    store.fail_next_delete(&path::item(&collection.id, &group.id, &victim.id));
    let err = engine.delete_group(&group).await.unwrap_err();
    assert!(matches!(err, DomainError::Store(_)));
    assert_eq!(collection_total(&engine, &collection.id).await.to_string(), "30.00");

    // the cascade is idempotent, so the retry finishes the job and the
    // collection drops by the pre-deletion total exactly once
    engine.delete_group(&group).await.unwrap();
    assert!(engine.list_groups(&collection.id).await.unwrap().is_empty());
    assert!(engine
        .list_items(&collection.id, &group.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(collection_total(&engine, &collection.id).await.to_string(), "0.00");
}

#[tokio::test]
async fn test_file_backed_app_keeps_totals_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("colecao.db");

    let collection_id;
    {
        let app = App::open(&db_path).await.unwrap();
        app.session.sign_in("user-1");
        let collection = app.engine.create_collection("Moedas").await.unwrap();
        let group = app.engine.create_group(&collection.id, "Réis").await.unwrap();
        app.engine
            .create_item(&collection.id, &group.id, input("960 réis", "75,00"))
            .await
            .unwrap();
        collection_id = collection.id;
    }

    let app = App::open(&db_path).await.unwrap();
    app.session.sign_in("user-1");
    assert_eq!(
        collection_total(&app.engine, &collection_id).await.to_string(),
        "75.00"
    );
}
