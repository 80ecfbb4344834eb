use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    contact::{
        dto::{ContactRequest, ContactResponse},
        repo_types::ContactMessageRecord,
    },
    state::AppState,
    validate::is_valid_email,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(mut payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let record = ContactMessageRecord {
        name: payload.name,
        email: payload.email,
        message: payload.message,
        subject: payload.subject,
        handled: false,
        received_at: OffsetDateTime::now_utc(),
    };

    let id = record.insert(state.store.as_ref()).await.map_err(|e| {
        error!(error = %e, "store contact message failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(message_id = %id, email = %record.email, "contact message received");
    Ok(Json(ContactResponse { status: "ok", id }))
}
