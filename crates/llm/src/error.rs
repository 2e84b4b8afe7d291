use studio_core::{CollaboratorError, CollaboratorErrorKind};
use thiserror::Error;

/// Chat client error types
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Chat API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Chat API rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Chat API rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LlmError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api {
                status_code: Some(code),
                ..
            } => *code >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<LlmError> for CollaboratorError {
    fn from(e: LlmError) -> Self {
        let kind = match &e {
            LlmError::RateLimited { .. } => CollaboratorErrorKind::RateLimited,
            LlmError::Unauthorized(_) | LlmError::InvalidConfig(_) => {
                CollaboratorErrorKind::Unauthorized
            }
            LlmError::Api { .. } => CollaboratorErrorKind::Api,
            LlmError::Http(_) | LlmError::Serialization(_) => CollaboratorErrorKind::Transport,
        };
        CollaboratorError::new(kind, e.to_string())
    }
}

/// Result type alias for chat operations
pub type LlmResult<T> = Result<T, LlmError>;
