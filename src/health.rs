use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(diagnostics))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "landing-api running" }))
}

#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub backend: &'static str,
    pub database: String,
    pub database_url: &'static str,
    pub database_name: Option<String>,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
}

const ERROR_CHARS: usize = 80;

fn short_error(e: impl std::fmt::Display) -> String {
    e.to_string().chars().take(ERROR_CHARS).collect()
}

fn database_name(url: &str) -> Option<String> {
    let tail = url.rsplit('/').next()?;
    let name = tail.split('?').next().unwrap_or(tail);
    if name.is_empty() || name.contains('@') {
        None
    } else {
        Some(name.to_string())
    }
}

#[instrument(skip(state))]
pub async fn diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    let database_url = if std::env::var("DATABASE_URL").is_ok() {
        "set"
    } else {
        "not set"
    };

    let mut res = Diagnostics {
        backend: "running",
        database: "not available".into(),
        database_url,
        database_name: database_name(&state.config.database_url),
        connection_status: "not connected",
        collections: vec![],
    };

    match state.store.ping().await {
        Ok(()) => {
            res.connection_status = "connected";
            match state.store.collection_names().await {
                Ok(mut names) => {
                    names.truncate(10);
                    res.collections = names;
                    res.database = "connected and working".into();
                }
                Err(e) => {
                    warn!(error = %e, "listing collections failed");
                    res.database = format!("connected but error: {}", short_error(e));
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "database ping failed");
            res.database = format!("error: {}", short_error(e));
        }
    }

    Json(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_from_url() {
        assert_eq!(
            database_name("postgres://u:p@localhost:5432/landing"),
            Some("landing".to_string())
        );
        assert_eq!(
            database_name("postgres://u:p@localhost:5432/landing?sslmode=disable"),
            Some("landing".to_string())
        );
        assert_eq!(database_name("postgres://u:p@localhost:5432/"), None);
    }

    #[test]
    fn short_error_caps_at_80_chars() {
        assert_eq!(short_error("x".repeat(200)).chars().count(), ERROR_CHARS);
        assert_eq!(short_error("brief"), "brief");
    }

    #[tokio::test]
    async fn diagnostics_truncates_long_database_errors() {
        use crate::store::{Document, DocumentStore, StoreError};
        use async_trait::async_trait;
        use serde_json::Value;
        use std::sync::Arc;
        use uuid::Uuid;

        fn broken() -> StoreError {
            StoreError::Database(sqlx::Error::Protocol("x".repeat(200)))
        }

        struct BrokenStore;

        #[async_trait]
        impl DocumentStore for BrokenStore {
            async fn create_document(&self, _c: &str, _b: Value) -> Result<Uuid, StoreError> {
                Err(broken())
            }
            async fn get_documents(
                &self,
                _c: &str,
                _f: Value,
                _l: i64,
            ) -> Result<Vec<Document>, StoreError> {
                Err(broken())
            }
            async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
                Err(broken())
            }
            async fn ping(&self) -> Result<(), StoreError> {
                Err(broken())
            }
        }

        let state = crate::state::AppState::from_parts(
            Arc::new(BrokenStore),
            AppState::fake().config,
        );
        let Json(res) = diagnostics(State(state)).await;
        assert_eq!(res.connection_status, "not connected");
        assert!(res.database.starts_with("error: "));
        assert_eq!(res.database.chars().count(), "error: ".len() + ERROR_CHARS);
    }

    #[tokio::test]
    async fn diagnostics_reports_collections() {
        let state = AppState::fake();
        state
            .store
            .create_document("user", serde_json::json!({}))
            .await
            .unwrap();

        let Json(res) = diagnostics(State(state)).await;
        assert_eq!(res.backend, "running");
        assert_eq!(res.connection_status, "connected");
        assert_eq!(res.collections, vec!["user".to_string()]);
    }
}
