//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orgdesk_permissions::StoreError;
use serde_json::json;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Permissions(#[from] orgdesk_permissions::Error),

    #[error(transparent)]
    Layout(#[from] orgdesk_layout::Error),
}

impl ApiError {
    /// HTTP status and machine-readable error type
    pub fn classify(&self) -> (StatusCode, &'static str) {
        use orgdesk_layout::Error as LayoutError;
        use orgdesk_permissions::Error as PermissionError;

        match self {
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Permissions(e) => match e {
                PermissionError::Validation(_)
                | PermissionError::InvalidPermissionLevel(_)
                | PermissionError::InvalidGlobPattern(_) => {
                    (StatusCode::BAD_REQUEST, "validation_error")
                }
                PermissionError::Unauthorized(_) => (StatusCode::FORBIDDEN, "authorization_error"),
                PermissionError::NotFound { .. }
                | PermissionError::Store(StoreError::NotFound { .. }) => {
                    (StatusCode::NOT_FOUND, "not_found")
                }
                PermissionError::Conflict(_) | PermissionError::ImmutableTemplate(_) => {
                    (StatusCode::CONFLICT, "conflict")
                }
                PermissionError::Store(store) if store.is_conflict() => {
                    (StatusCode::CONFLICT, "conflict")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
            ApiError::Layout(e) => match e {
                LayoutError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                LayoutError::Unauthorized(_) => (StatusCode::FORBIDDEN, "authorization_error"),
                LayoutError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                LayoutError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
