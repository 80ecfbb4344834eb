use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Contact-form submission as stored in the `contactmessage` collection.
/// `handled` starts false; flipping it is an operator concern, not an API one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageRecord {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
    pub handled: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}
