//! Service status and statistics.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::db::UserRepository;
use crate::file::NodeRepository;
use crate::web::dto::{StatsResponse, StatusResponse};
use crate::web::error::ApiError;

/// `GET /status`: liveness of the database and the blob store.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        db: state.db.ping().await,
        storage: state.storage.is_available(),
    })
}

/// `GET /stats`: global user and node counts.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let users = UserRepository::new(state.db.pool()).count().await?;
    let files = NodeRepository::new(state.db.pool()).count().await?;

    Ok(Json(StatsResponse { users, files }))
}
