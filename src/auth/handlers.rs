use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        password::{hash_password, verify_password},
        repo_types::{StoredUser, UserRecord},
        token::issue_token,
    },
    state::AppState,
    store::StoreError,
    validate::is_valid_email,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    // Ensure email is not taken. The store's unique index on the `user`
    // collection still catches the race between this check and the insert.
    match StoredUser::find_by_email(state.store.as_ref(), &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::BAD_REQUEST, "Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let record = UserRecord {
        name: payload.name,
        email: payload.email,
        password_hash,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };

    let id = match record.insert(state.store.as_ref()).await {
        Ok(id) => id,
        Err(StoreError::Duplicate(_)) => {
            warn!(email = %record.email, "signup lost duplicate-email race");
            return Err((StatusCode::BAD_REQUEST, "Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let token = issue_token();
    info!(user_id = %id, email = %record.email, "user signed up");
    Ok(Json(AuthResponse {
        user: PublicUser::from(StoredUser { id, record }),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    // Unknown email and wrong password must be indistinguishable to the
    // client, so both paths produce the same status and message.
    let user = match StoredUser::find_by_email(state.store.as_ref(), &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !verify_password(&payload.password, &user.record.password_hash) {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let token = issue_token();
    info!(user_id = %user.id, email = %user.record.email, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(user),
        token,
    }))
}
