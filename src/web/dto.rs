//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::file::{FileNode, ParentRef};

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user as returned by the API. The password digest never leaves.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Body of a successful `GET /connect`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub db: bool,
    pub storage: bool,
}

/// Body of `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: i64,
    pub files: i64,
}

/// Body of `POST /files`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub is_public: bool,
    pub data: Option<String>,
}

/// A node as returned by the API. The blob reference stays internal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_public: bool,
    pub parent_id: i64,
}

impl From<&FileNode> for NodeResponse {
    fn from(node: &FileNode) -> Self {
        Self {
            id: node.id,
            user_id: node.owner_id,
            name: node.name.clone(),
            kind: node.kind.as_str().to_string(),
            is_public: node.is_public,
            parent_id: node.parent.as_wire(),
        }
    }
}

/// Query string of `GET /files`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub parent_id: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Page number; anything unparseable or negative is coerced to 0.
    /// Oversized values saturate so a huge page reads as empty.
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Requested parent; absent means the root, unparseable means no
    /// folder can match.
    pub fn parent(&self) -> Option<ParentRef> {
        match self.parent_id.as_deref() {
            None => Some(ParentRef::Root),
            Some(raw) => raw.parse::<i64>().ok().map(ParentRef::from_wire),
        }
    }
}

/// Query string of `GET /files/:id/data`.
#[derive(Debug, Deserialize, Default)]
pub struct DataQuery {
    pub size: Option<String>,
}
