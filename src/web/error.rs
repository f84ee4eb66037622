//! HTTP error mapping.
//!
//! Domain errors are folded into a small set of wire errors with a
//! stable JSON shape. Anything unexpected is logged and answered with a
//! generic 500 so internals never leak.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::DepotError;

/// Error as it appears on the wire.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// 400 with a caller-facing message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BadRequest",
            message: message.into(),
        }
    }

    /// 401 with the standard message.
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "Unauthorized",
            message: "Unauthorized".to_string(),
        }
    }

    /// 404 with the standard message.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NotFound",
            message: "Not found".to_string(),
        }
    }

    /// 500 with a generic message.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "Internal",
            message: "Internal server error".to_string(),
        }
    }
}

impl From<DepotError> for ApiError {
    fn from(err: DepotError) -> Self {
        match err {
            DepotError::Validation(message) => ApiError::bad_request(message),
            DepotError::Auth(_) => ApiError::unauthorized(),
            DepotError::NotFound(_) => ApiError::not_found(),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from(DepotError::Validation("Missing name".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing name");
    }

    #[test]
    fn test_auth_maps_to_401() {
        let err = ApiError::from(DepotError::Auth("invalid credentials".to_string()));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Unauthorized");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(DepotError::NotFound("node".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Not found");
    }

    #[test]
    fn test_other_errors_are_opaque() {
        let err = ApiError::from(DepotError::Database("secret table missing".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secret"));
    }
}
