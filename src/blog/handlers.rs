use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    blog::{
        dto::{CreatePostRequest, ListQuery, PostList, PostResponse},
        repo_types::{BlogPostRecord, StoredPost},
    },
    state::AppState,
};

const EXCERPT_CHARS: usize = 180;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blog", get(list_posts).post(create_post))
        .route("/blog/:slug", get(get_post))
}

fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "-")
}

/// First `EXCERPT_CHARS` characters with a trailing ellipsis, or the whole
/// content when it is short enough. Counts characters, not bytes, so
/// multi-byte content never splits mid-character.
fn excerpt_of(content: &str) -> String {
    if content.chars().count() > EXCERPT_CHARS {
        let mut cut: String = content.chars().take(EXCERPT_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        content.to_string()
    }
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<PostList>, (StatusCode, String)> {
    let posts = StoredPost::list_published(state.store.as_ref(), q.limit)
        .await
        .map_err(|e| {
            error!(error = %e, "list posts failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(PostList {
        items: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, (StatusCode, String)> {
    match StoredPost::find_by_slug(state.store.as_ref(), &slug).await {
        Ok(Some(post)) => Ok(Json(PostResponse::from(post))),
        Ok(None) => {
            warn!(%slug, "post not found");
            Err((StatusCode::NOT_FOUND, "Post not found".into()))
        }
        Err(e) => {
            error!(error = %e, %slug, "get post failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<PostResponse>, (StatusCode, String)> {
    let record = BlogPostRecord {
        slug: slugify(&payload.title),
        excerpt: Some(excerpt_of(&payload.content)),
        title: payload.title,
        content: payload.content,
        author: payload.author,
        tags: payload.tags.unwrap_or_default(),
        published_at: Some(OffsetDateTime::now_utc()),
        status: payload.status,
    };

    let id = record.insert(state.store.as_ref()).await.map_err(|e| {
        error!(error = %e, "create post failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(post_id = %id, slug = %record.slug, "post created");
    Ok(Json(PostResponse::from(StoredPost { id, record })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Trimmed Title "), "trimmed-title");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn excerpt_keeps_short_content_verbatim() {
        assert_eq!(excerpt_of("short post"), "short post");
    }

    #[test]
    fn excerpt_truncates_long_content_at_char_boundary() {
        let long: String = "é".repeat(200);
        let excerpt = excerpt_of(&long);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
    }

    fn create_payload(title: &str, content: &str, status: &str) -> Json<CreatePostRequest> {
        Json(CreatePostRequest {
            title: title.into(),
            content: content.into(),
            author: "ada".into(),
            tags: Some(vec!["rust".into()]),
            status: status.into(),
        })
    }

    #[tokio::test]
    async fn create_then_fetch_by_slug() {
        let state = AppState::fake();

        let Json(created) = create_post(
            State(state.clone()),
            create_payload("Hello World", "first post", "published"),
        )
        .await
        .expect("create should succeed");
        assert_eq!(created.slug, "hello-world");
        assert!(created.published_at.is_some());

        let Json(fetched) = get_post(State(state), Path("hello-world".into()))
            .await
            .expect("fetch should succeed");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Hello World");
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let state = AppState::fake();
        let (status, message) = get_post(State(state), Path("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Post not found");
    }

    #[tokio::test]
    async fn list_returns_only_published_and_respects_limit() {
        let state = AppState::fake();

        create_post(State(state.clone()), create_payload("One", "a", "published"))
            .await
            .unwrap();
        create_post(State(state.clone()), create_payload("Two", "b", "draft"))
            .await
            .unwrap();
        create_post(State(state.clone()), create_payload("Three", "c", "published"))
            .await
            .unwrap();

        let Json(all) = list_posts(State(state.clone()), Query(ListQuery { limit: 10 }))
            .await
            .unwrap();
        let slugs: Vec<_> = all.items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["one", "three"]);

        let Json(capped) = list_posts(State(state), Query(ListQuery { limit: 1 }))
            .await
            .unwrap();
        assert_eq!(capped.items.len(), 1);
    }

    #[tokio::test]
    async fn negative_limit_yields_no_posts_instead_of_erroring() {
        let state = AppState::fake();
        create_post(State(state.clone()), create_payload("One", "a", "published"))
            .await
            .unwrap();

        let Json(res) = list_posts(State(state), Query(ListQuery { limit: -1 }))
            .await
            .expect("negative limit should not be a server error");
        assert!(res.items.is_empty());
    }
}
