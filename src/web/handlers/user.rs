//! Account registration and profile.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::AppState;
use crate::auth::hash_password;
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{RegisterRequest, UserResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// `POST /users`: register a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = match body.email {
        Some(ref e) if !e.is_empty() => e.clone(),
        _ => return Err(ApiError::bad_request("Missing email")),
    };
    let password = match body.password {
        Some(ref p) if !p.is_empty() => p.clone(),
        _ => return Err(ApiError::bad_request("Missing password")),
    };

    let repo = UserRepository::new(state.db.pool());
    if repo.email_exists(&email).await? {
        return Err(ApiError::bad_request("Already exist"));
    }

    let digest = hash_password(&password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::internal()
    })?;

    let user = repo.create(&NewUser::new(email, digest)).await?;
    info!(user_id = user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// `GET /users/me`: profile of the authenticated user.
pub async fn me(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await?
        // Session outlived the account
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(UserResponse::from(&user)))
}
