//! Session endpoints: connect and disconnect.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use tracing::debug;

use super::AppState;
use crate::db::UserRepository;
use crate::web::dto::TokenResponse;
use crate::web::error::ApiError;
use crate::web::middleware::{parse_basic_credentials, AuthUser, TOKEN_HEADER};

/// `GET /connect`: exchange Basic credentials for a session token.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let (email, password) = parse_basic_credentials(header)?;

    let user = UserRepository::new(state.db.pool())
        .get_by_email(&email)
        .await?;

    let session = state.sessions.issue(user.as_ref(), &password).await?;
    debug!(user_id = session.user_id, "Session opened");

    Ok(Json(TokenResponse {
        token: session.token,
    }))
}

/// `GET /disconnect`: revoke the presented token.
pub async fn disconnect(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    // AuthUser succeeded, so the header is present
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        state.sessions.revoke(token).await;
    }
    debug!(user_id, "Session closed");

    Ok(StatusCode::NO_CONTENT)
}
