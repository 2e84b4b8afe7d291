use serde::{Deserialize, Serialize};
use studio_core::SearchHit;

/// Request body for the `/search` endpoint
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub api_key: &'a str,
    pub query: &'a str,
    pub max_results: usize,
}

/// Response from the `/search` endpoint
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
}

/// A single result. Every field is optional on the wire.
#[derive(Debug, Deserialize)]
pub struct SearchResultItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl From<SearchResultItem> for SearchHit {
    fn from(item: SearchResultItem) -> Self {
        SearchHit::new(
            item.content.unwrap_or_default(),
            item.url.unwrap_or_default(),
        )
    }
}
