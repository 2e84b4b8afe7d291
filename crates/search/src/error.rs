use studio_core::{CollaboratorError, CollaboratorErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Search API rate limited")]
    RateLimited,

    #[error("Search API rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Search returned no results for query: {0}")]
    NoResults(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<SearchError> for CollaboratorError {
    fn from(e: SearchError) -> Self {
        let kind = match &e {
            SearchError::RateLimited => CollaboratorErrorKind::RateLimited,
            SearchError::Unauthorized(_) | SearchError::InvalidConfig(_) => {
                CollaboratorErrorKind::Unauthorized
            }
            SearchError::Api { .. } => CollaboratorErrorKind::Api,
            SearchError::NoResults(_) => CollaboratorErrorKind::Empty,
            SearchError::Http(_) => CollaboratorErrorKind::Transport,
        };
        CollaboratorError::new(kind, e.to_string())
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
