use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use studio_core::{CollaboratorError, Retriever, SearchHit};
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};
use crate::types::{SearchRequest, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_results: usize,
    pub timeout: Duration,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the Tavily search API
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    config: TavilyConfig,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> SearchResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(SearchError::InvalidConfig("API key is empty".to_string()));
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TavilyConfig {
        &self.config
    }

    /// Run a search and return at most `max_results` hits.
    ///
    /// An empty result list is reported as [`SearchError::NoResults`].
    pub async fn search_hits(&self, query: &str) -> SearchResult<Vec<SearchHit>> {
        debug!(query = %query, max_results = self.config.max_results, "Searching");

        let request = SearchRequest {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Search request failed");

            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => SearchError::RateLimited,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SearchError::Unauthorized(error_text)
                }
                _ => SearchError::Api {
                    message: error_text,
                    status_code: Some(status.as_u16()),
                },
            });
        }

        let body: SearchResponse = response.json().await?;
        let hits: Vec<SearchHit> = body
            .results
            .into_iter()
            .take(self.config.max_results)
            .map(SearchHit::from)
            .collect();

        if hits.is_empty() {
            return Err(SearchError::NoResults(query.to_string()));
        }

        debug!(hit_count = hits.len(), "Search completed");
        Ok(hits)
    }
}

#[async_trait]
impl Retriever for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        Ok(self.search_hits(query).await?)
    }
}
