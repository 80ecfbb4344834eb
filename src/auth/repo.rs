use serde_json::json;
use uuid::Uuid;

use crate::auth::repo_types::{StoredUser, UserRecord};
use crate::store::{DocumentStore, StoreError};

pub const COLLECTION: &str = "user";

impl StoredUser {
    /// Find a user by email. At most one exists per address; the store
    /// enforces this with a unique index on the `user` collection.
    pub async fn find_by_email(
        store: &dyn DocumentStore,
        email: &str,
    ) -> Result<Option<StoredUser>, StoreError> {
        let docs = store
            .get_documents(COLLECTION, json!({ "email": email }), 1)
            .await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(StoredUser {
                id: doc.id,
                record: serde_json::from_value(doc.body)?,
            })),
            None => Ok(None),
        }
    }
}

impl UserRecord {
    /// Insert a new user document, returning the generated id.
    pub async fn insert(&self, store: &dyn DocumentStore) -> Result<Uuid, StoreError> {
        store
            .create_document(COLLECTION, serde_json::to_value(self)?)
            .await
    }
}
