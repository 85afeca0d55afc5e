//! Database Connection and Setup
//!
//! SQLite-backed `DocumentStore` over libsql. All documents share one
//! `documents` table: full path as primary key, parent path for child
//! queries, fields as JSON text. Filtering and ordering happen in Rust over
//! the parent-scoped rows, so the SQL stays trivial and backend-portable.

use async_trait::async_trait;
use libsql::{Builder, Connection};
use serde_json::Value;
use std::path::Path;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::document::{
    sort_documents, Direction, Document, DocumentStore, Fields, StoreError, StoreResult,
};

/// libsql implementation of the document store
pub struct LibsqlStore {
    conn: Mutex<Connection>,
}

/// Open (or create) the database at `db_path` and run migrations.
/// Pass `:memory:` for an ephemeral database.
pub async fn init_db(db_path: &Path) -> StoreResult<LibsqlStore> {
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| StoreError::Backend("invalid database path".to_string()))?;

    let db = Builder::new_local(db_path_str)
        .build()
        .await
        .map_err(|e| StoreError::Backend(format!("failed to build db: {}", e)))?;

    let conn = db
        .connect()
        .map_err(|e| StoreError::Backend(format!("failed to connect: {}", e)))?;

    run_migrations(&conn).await?;
    log::info!("document store ready at {}", db_path_str);

    Ok(LibsqlStore {
        conn: Mutex::new(conn),
    })
}

/// Run database migrations
async fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            path TEXT PRIMARY KEY,
            parent TEXT NOT NULL,
            fields TEXT NOT NULL
        )",
        (),
    )
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    // Index for child queries, the hot path of every list screen
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent)",
        (),
    )
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(())
}

fn parse_fields(raw: &str, path: &str) -> StoreResult<Fields> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(StoreError::Backend(format!(
            "corrupt document fields at {}",
            path
        ))),
    }
}

fn encode_fields(fields: &Fields) -> String {
    Value::Object(fields.clone()).to_string()
}

impl LibsqlStore {
    async fn children(&self, parent: &str) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT path, fields FROM documents WHERE parent = ?",
                libsql::params![parent],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut docs = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let path = row
                .get::<String>(0)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let raw = row
                .get::<String>(1)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let id = path
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            docs.push(Document {
                id,
                fields: parse_fields(&raw, &path)?,
            });
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStore for LibsqlStore {
    async fn insert(&self, parent: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let path = format!("{}/{}", parent, id);

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (path, parent, fields) VALUES (?, ?, ?)",
            libsql::params![path, parent, encode_fields(&fields)],
        )
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(id)
    }

    async fn get(&self, path: &str) -> StoreResult<Option<Fields>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT fields FROM documents WHERE path = ?",
                libsql::params![path],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Ok(Some(row)) = rows.next().await {
            let raw = row
                .get::<String>(0)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(Some(parse_fields(&raw, path)?))
        } else {
            Ok(None)
        }
    }

    async fn update(&self, path: &str, partial: Fields) -> StoreResult<()> {
        // Read-merge-write; there is no isolation between the two statements,
        // matching the rest of the store's non-transactional contract.
        let mut merged = self
            .get(path)
            .await?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        for (key, value) in partial {
            merged.insert(key, value);
        }

        let conn = self.conn.lock().await;
        let affected = conn
            .execute(
                "UPDATE documents SET fields = ? WHERE path = ?",
                libsql::params![encode_fields(&merged), path],
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if affected == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM documents WHERE path = ?",
            libsql::params![path],
        )
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn query_by_equality(
        &self,
        parent: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = self.children(parent).await?;
        docs.retain(|d| d.fields.get(field) == Some(value));
        Ok(docs)
    }

    async fn query_ordered_by(
        &self,
        parent: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = self.children(parent).await?;
        sort_documents(&mut docs, field, direction);
        Ok(docs)
    }
}
