//! API error taxonomy and HTTP mapping.
//!
//! Every failure that can still be reported as a structured JSON body goes
//! through [`ApiError`]. Failures that occur after a streaming response has
//! committed its headers cannot use this path; the speech relay terminates
//! the connection instead (see `api::speech`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Result alias for request handlers and store operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Typed errors surfaced at the request boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed. Caller's fault.
    #[error("{0}")]
    Validation(String),

    /// No upstream credential is configured.
    #[error("{0}")]
    Unauthorized(String),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique-constraint violation (library catalog uuid).
    #[error("{0}")]
    Duplicate(String),

    /// The synthesis provider failed before any response bytes were sent.
    #[error("Error generating audio")]
    Upstream {
        /// Provider-reported detail, forwarded to the caller.
        detail: String,
    },

    /// Anything else. Details are logged, not leaked.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Upstream { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Upstream { detail } => {
                json!({ "message": self.to_string(), "error": detail })
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                json!({ "message": "Internal server error" })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
