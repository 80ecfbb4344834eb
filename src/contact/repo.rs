use uuid::Uuid;

use crate::contact::repo_types::ContactMessageRecord;
use crate::store::{DocumentStore, StoreError};

pub const COLLECTION: &str = "contactmessage";

impl ContactMessageRecord {
    pub async fn insert(&self, store: &dyn DocumentStore) -> Result<Uuid, StoreError> {
        store
            .create_document(COLLECTION, serde_json::to_value(self)?)
            .await
    }
}
