use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A storage-level uniqueness constraint rejected the insert.
    #[error("duplicate document in collection `{0}`")]
    Duplicate(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A stored document: generated id plus JSON body.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub body: Value,
}

/// Generic create/query interface over named collections.
///
/// Injected through `AppState` so handlers never touch a concrete driver.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a JSON object into a collection, returning the generated id.
    async fn create_document(&self, collection: &str, body: Value) -> Result<Uuid, StoreError>;

    /// Up to `limit` documents whose body contains every key/value pair of
    /// the equality `filter`, in insertion order.
    async fn get_documents(
        &self,
        collection: &str,
        filter: Value,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError>;

    /// Distinct collection names, for diagnostics.
    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Connectivity check, for diagnostics.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Postgres-backed store: one JSONB table, collections as a text column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn create_document(&self, collection: &str, body: Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(collection)
        .bind(&body)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(collection.to_string())
            }
            _ => StoreError::Database(e),
        })?;
        Ok(id)
    }

    async fn get_documents(
        &self,
        collection: &str,
        filter: Value,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        // `@>` containment keeps filter semantics equality-only; `seq`
        // preserves insertion order.
        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq ASC
            LIMIT $3
            "#,
        )
        .bind(collection)
        .bind(&filter)
        // Postgres rejects a negative LIMIT; treat it as zero.
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        let docs = rows
            .into_iter()
            .map(|row| {
                Ok(Document {
                    id: row.try_get("id")?,
                    body: row.try_get("body")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(docs)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT collection FROM documents ORDER BY collection
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| Ok(row.try_get("collection")?))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory store for tests and `AppState::fake()`. Insertion order per
/// collection; no uniqueness constraints.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
}

fn matches(body: &Value, filter: &Value) -> bool {
    match filter.as_object() {
        Some(pairs) => pairs.iter().all(|(k, v)| body.get(k) == Some(v)),
        None => true,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, collection: &str, body: Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document { id, body });
        Ok(id)
    }

    async fn get_documents(
        &self,
        collection: &str,
        filter: Value,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().unwrap();
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(&d.body, &filter))
                    .take(limit.max(0) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections.keys().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_filter_by_equality() {
        let store = MemoryStore::default();
        store
            .create_document("user", json!({"email": "a@b.com", "name": "A"}))
            .await
            .unwrap();
        store
            .create_document("user", json!({"email": "c@d.com", "name": "C"}))
            .await
            .unwrap();

        let docs = store
            .get_documents("user", json!({"email": "a@b.com"}), 10)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body["name"], "A");
    }

    #[tokio::test]
    async fn empty_filter_matches_all_in_insertion_order() {
        let store = MemoryStore::default();
        for i in 0..3 {
            store
                .create_document("blogpost", json!({"n": i}))
                .await
                .unwrap();
        }
        let docs = store.get_documents("blogpost", json!({}), 10).await.unwrap();
        let ns: Vec<_> = docs.iter().map(|d| d.body["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let store = MemoryStore::default();
        for i in 0..5 {
            store
                .create_document("blogpost", json!({"n": i}))
                .await
                .unwrap();
        }
        let docs = store.get_documents("blogpost", json!({}), 2).await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryStore::default();
        let docs = store.get_documents("nope", json!({}), 10).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn collection_names_are_distinct_and_sorted() {
        let store = MemoryStore::default();
        store.create_document("user", json!({})).await.unwrap();
        store.create_document("blogpost", json!({})).await.unwrap();
        store.create_document("user", json!({})).await.unwrap();
        let names = store.collection_names().await.unwrap();
        assert_eq!(names, vec!["blogpost".to_string(), "user".to_string()]);
    }

    #[test]
    fn document_serializes_id_as_underscore_id() {
        let doc = Document {
            id: Uuid::new_v4(),
            body: json!({"title": "hello"}),
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert!(v.get("_id").is_some());
        assert_eq!(v["title"], "hello");
    }
}
