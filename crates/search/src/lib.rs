//! Web search client used to gather research text.

pub mod client;
pub mod error;
pub mod types;

pub use client::{TavilyClient, TavilyConfig, DEFAULT_BASE_URL};
pub use error::{SearchError, SearchResult};
pub use types::*;
