//! Casebook error types

use std::time::Duration;

/// Casebook error types
#[derive(Debug, thiserror::Error)]
pub enum CasebookError {
    // Generator/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // Malformed generator output
    #[error("empty response from model")]
    EmptyResponse,

    #[error("no JSON object found in model output")]
    MissingJson,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output parsed but violates an artifact invariant (e.g. two correct options).
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    // Configuration errors
    #[error("no text generator configured")]
    NoGenerator,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Only reachable when [`RetryConfig`](crate::providers::RetryConfig) caps attempts.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<CasebookError>,
    },
}

impl CasebookError {
    /// Provider-suggested wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CasebookError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether this error came from the shape of the model output rather than
    /// the transport.
    pub fn is_malformed_output(&self) -> bool {
        matches!(
            self,
            CasebookError::EmptyResponse
                | CasebookError::MissingJson
                | CasebookError::Json(_)
                | CasebookError::InvalidArtifact(_)
        )
    }
}

/// Result type alias for Casebook operations
pub type Result<T> = std::result::Result<T, CasebookError>;
