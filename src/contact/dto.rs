use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub status: &'static str,
    pub id: Uuid,
}
