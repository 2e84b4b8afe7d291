use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a failed collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorErrorKind {
    /// Network failure, timeout, or unreadable response
    Transport,
    /// The service rejected the request because of rate limiting
    RateLimited,
    /// The service rejected the credentials
    Unauthorized,
    /// The service returned an error response
    Api,
    /// The service answered but returned nothing usable
    Empty,
}

impl CollaboratorErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::Api => "api",
            Self::Empty => "empty",
        }
    }
}

impl std::fmt::Display for CollaboratorErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a retrieval or generation collaborator.
#[derive(Error, Debug, Clone)]
#[error("{kind} error: {message}")]
pub struct CollaboratorError {
    pub kind: CollaboratorErrorKind,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(kind: CollaboratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Transport, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Empty, message)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
