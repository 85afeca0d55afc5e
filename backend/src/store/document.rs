//! Document Store - Core Trait
//!
//! The persistence collaborator: hierarchical documents addressed by
//! `/`-separated path segments, with CRUD plus two query shapes. There is no
//! transaction primitive; every call is an independent round-trip, and
//! callers that mutate several documents must sequence the writes themselves.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// The field map of one document
pub type Fields = serde_json::Map<String, Value>;

/// A document returned from a query: its id (final path segment) and fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Sort direction for ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Common result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level errors; repositories translate these into domain errors
#[derive(Debug, Clone)]
pub enum StoreError {
    /// No document at the given path
    NotFound(String),
    /// Underlying backend failure (I/O, corrupt fields, ...)
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(path) => write!(f, "No document at {}", path),
            StoreError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// The trait that all storage backends implement.
///
/// All operations are async to support remote backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document under `parent`. Returns the generated id.
    async fn insert(&self, parent: &str, fields: Fields) -> StoreResult<String>;

    /// Get a document's fields by full path.
    async fn get(&self, path: &str) -> StoreResult<Option<Fields>>;

    /// Merge `partial` into an existing document's fields.
    /// Fails with `NotFound` when the document is absent.
    async fn update(&self, path: &str, partial: Fields) -> StoreResult<()>;

    /// Delete the document at `path`. Deleting an absent document is not an
    /// error, so deletes can be retried safely. Child documents are untouched.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// All documents under `parent` whose `field` equals `value`.
    async fn query_by_equality(
        &self,
        parent: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>>;

    /// All documents under `parent`, sorted by `field`.
    async fn query_ordered_by(
        &self,
        parent: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>>;
}

/// Order two documents by one field. Missing fields sort last; values of
/// mismatched types compare equal, which keeps the sort stable.
pub(crate) fn compare_by_field(a: &Fields, b: &Fields, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => compare_values(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(x: &Value, y: &Value) -> Ordering {
    match (x, y) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Sort documents in place by `field` in the given direction.
pub(crate) fn sort_documents(docs: &mut [Document], field: &str, direction: Direction) {
    docs.sort_by(|a, b| {
        let ord = compare_by_field(&a.fields, &b.fields, field);
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
}
