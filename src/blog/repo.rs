use serde_json::json;
use uuid::Uuid;

use crate::blog::repo_types::{BlogPostRecord, StoredPost};
use crate::store::{Document, DocumentStore, StoreError};

pub const COLLECTION: &str = "blogpost";

fn from_document(doc: Document) -> Result<StoredPost, StoreError> {
    Ok(StoredPost {
        id: doc.id,
        record: serde_json::from_value(doc.body)?,
    })
}

impl StoredPost {
    /// Published posts in insertion order, up to `limit`.
    pub async fn list_published(
        store: &dyn DocumentStore,
        limit: i64,
    ) -> Result<Vec<StoredPost>, StoreError> {
        let docs = store
            .get_documents(COLLECTION, json!({ "status": "published" }), limit)
            .await?;
        docs.into_iter().map(from_document).collect()
    }

    pub async fn find_by_slug(
        store: &dyn DocumentStore,
        slug: &str,
    ) -> Result<Option<StoredPost>, StoreError> {
        let docs = store
            .get_documents(COLLECTION, json!({ "slug": slug }), 1)
            .await?;
        docs.into_iter().next().map(from_document).transpose()
    }
}

impl BlogPostRecord {
    pub async fn insert(&self, store: &dyn DocumentStore) -> Result<Uuid, StoreError> {
        store
            .create_document(COLLECTION, serde_json::to_value(self)?)
            .await
    }
}
