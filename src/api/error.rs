//! Error types for backend calls.

use thiserror::Error;

/// Errors from building requests, talking to the backend, or validating its
/// responses.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or no response arrived
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-2xx status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail`/`error`/`message` from the body, or the raw body
        message: String,
    },

    /// 2xx response with `success: false`
    #[error("Backend reported failure: {0}")]
    Backend(String),

    /// Body parsed as JSON but violates the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Body is not valid JSON for the expected type
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request cannot be built from the given inputs
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading an upload from disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Create a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "No se pudo conectar con el servidor".to_string(),
            ApiError::Status { status: 401, .. } => "Sesión expirada, inicia sesión de nuevo".to_string(),
            ApiError::Status { message, .. } | ApiError::Backend(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
