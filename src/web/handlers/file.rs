//! File tree endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use super::AppState;
use crate::file::{CreateNodeInput, NodeRepository};
use crate::web::dto::{CreateNodeRequest, DataQuery, ListQuery, NodeResponse};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, MaybeAuthUser};

/// Parse a path segment as a node ID; anything else reads as absent.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found())
}

/// `POST /files`: create a folder, file or image node.
pub async fn create_node(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<NodeResponse>), ApiError> {
    let node = state
        .file_service()
        .create(
            user_id,
            CreateNodeInput {
                name: body.name,
                kind: body.kind,
                parent_id: body.parent_id,
                is_public: body.is_public,
                data: body.data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(NodeResponse::from(&node))))
}

/// `GET /files/:id`: metadata of one of the caller's nodes.
pub async fn get_node(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NodeResponse>, ApiError> {
    let id = parse_id(&id)?;

    let node = NodeRepository::new(state.db.pool())
        .get(user_id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(NodeResponse::from(&node)))
}

/// `GET /files`: page through the caller's children of a parent.
pub async fn list_nodes(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<NodeResponse>>, ApiError> {
    // An unparseable parentId matches nothing
    let Some(parent) = query.parent() else {
        return Ok(Json(Vec::new()));
    };

    let nodes = NodeRepository::new(state.db.pool())
        .list(user_id, parent, query.page())
        .await?;

    Ok(Json(nodes.iter().map(NodeResponse::from).collect()))
}

/// `PUT /files/:id/publish`: make a node publicly readable.
pub async fn publish(
    auth: AuthUser,
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<Json<NodeResponse>, ApiError> {
    set_public(auth, state, id, true).await
}

/// `PUT /files/:id/unpublish`: make a node private again.
pub async fn unpublish(
    auth: AuthUser,
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<Json<NodeResponse>, ApiError> {
    set_public(auth, state, id, false).await
}

async fn set_public(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    public: bool,
) -> Result<Json<NodeResponse>, ApiError> {
    let id = parse_id(&id)?;

    let node = NodeRepository::new(state.db.pool())
        .set_public(user_id, id, public)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(NodeResponse::from(&node)))
}

/// `GET /files/:id/data`: raw content of a file or image node.
///
/// Public nodes are readable without a token. `size` selects a resized
/// derivative for image nodes.
pub async fn node_data(
    MaybeAuthUser(identity): MaybeAuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let size = match query.size.as_deref() {
        None => None,
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| ApiError::bad_request("Invalid size parameter"))?,
        ),
    };

    let (node, bytes) = state.file_service().content(identity, id, size).await?;

    let mime = mime_guess::from_path(&node.name).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes))
}
