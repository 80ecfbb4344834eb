use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::blog::repo_types::StoredPost;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "published".into()
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub items: Vec<PostResponse>,
}

impl From<StoredPost> for PostResponse {
    fn from(post: StoredPost) -> Self {
        Self {
            id: post.id,
            title: post.record.title,
            slug: post.record.slug,
            excerpt: post.record.excerpt,
            content: post.record.content,
            author: post.record.author,
            tags: post.record.tags,
            published_at: post.record.published_at,
            status: post.record.status,
        }
    }
}
