use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// User document as stored in the `user` collection. This is the storage
/// shape: `password_hash` is present here and must never leak into a
/// response (handlers return `PublicUser` instead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A user document read back from the store, id attached.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub record: UserRecord,
}
