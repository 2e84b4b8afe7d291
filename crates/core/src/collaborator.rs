//! Boundary traits for the external services the pipeline depends on.
//!
//! The pipeline never talks HTTP directly. Concrete clients live in the
//! `search` and `llm` crates; tests substitute in-memory implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;

/// A single retrieval result. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
        }
    }
}

/// Free-text search service used by the researcher.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Run a query and return results in ranked order.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError>;
}

/// Text generation service used by the writer and the reviewer.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a single free-text prompt.
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;

    /// Identifier of the model behind this generator, recorded in results.
    fn model_name(&self) -> &str;
}
