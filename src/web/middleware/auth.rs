//! Request authentication.
//!
//! The session store is injected into request extensions by a router
//! layer; the extractors below read it back out. `AuthUser` rejects the
//! request when no valid token is presented, `MaybeAuthUser` degrades to
//! anonymous instead.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::auth::SessionStore;
use crate::web::error::ApiError;
use crate::{DepotError, Result};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// Extractor for a required authenticated user ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

/// Extractor for an optional authenticated user ID.
///
/// A missing, unknown or expired token yields `None` rather than a
/// rejection.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<i64>);

async fn resolve_token(parts: &Parts) -> Option<i64> {
    let token = parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())?;

    let sessions = parts.extensions.get::<Arc<SessionStore>>()?;
    sessions.resolve(token).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            match resolve_token(parts).await {
                Some(user_id) => Ok(AuthUser(user_id)),
                None => Err(ApiError::unauthorized()),
            }
        })
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { Ok(MaybeAuthUser(resolve_token(parts).await)) })
    }
}

/// Parse an HTTP Basic `Authorization` header value into `(email, password)`.
pub fn parse_basic_credentials(header: &str) -> Result<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| DepotError::Auth("not a Basic authorization header".to_string()))?;

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| DepotError::Auth("malformed Basic credentials".to_string()))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| DepotError::Auth("malformed Basic credentials".to_string()))?;

    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| DepotError::Auth("malformed Basic credentials".to_string()))?;

    if email.is_empty() || password.is_empty() {
        return Err(DepotError::Auth("missing email or password".to_string()));
    }

    Ok((email.to_string(), password.to_string()))
}
