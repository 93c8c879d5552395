//! Error types for the outreach service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors that can occur in the outreach service
#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] outreach_auth::AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutreachError {
    pub fn status(&self) -> StatusCode {
        match self {
            OutreachError::Validation(_) => StatusCode::BAD_REQUEST,
            OutreachError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Validation messages go back to the caller. Anything else is logged and
/// answered with a generic message.
impl IntoResponse for OutreachError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            OutreachError::Validation(message) => message.clone(),
            OutreachError::Unauthorized => self.to_string(),
            OutreachError::Transport(detail) => {
                tracing::error!("Mail transport failure: {}", detail);
                "Failed to send email".to_string()
            }
            other => {
                tracing::error!("Request failed: {}", other);
                "Internal server error".to_string()
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for outreach operations
pub type Result<T> = std::result::Result<T, OutreachError>;
