use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Blog post document as stored in the `blogpost` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostRecord {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    /// "draft" or "published".
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub id: Uuid,
    pub record: BlogPostRecord,
}
