use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use studio_core::{CollaboratorError, Generator};
use tracing::{debug, error, info, warn};

use super::types::*;
use crate::error::{LlmError, LlmResult};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 60000;

/// Connection and sampling settings for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Upper bound for a single wait, including server-requested ones
    pub max_backoff: Duration,
}

impl ChatClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.7),
            max_tokens: Some(4000),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }
}

/// Client for OpenAI-compatible chat completion APIs
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    /// Build a client. Fails when the API key is blank so that missing
    /// credentials surface before any request is made.
    pub fn new(config: ChatClientConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig("API key is empty".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig("model is empty".to_string()));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatClientConfig {
        &self.config
    }

    async fn with_retry<T, F, Fut>(&self, operation: F, operation_name: &str) -> LlmResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = LlmResult<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut retries = 0;
        let max_backoff_ms = self.config.max_backoff.as_millis() as u64;
        let mut backoff_ms = self.config.initial_backoff.as_millis() as u64;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    if retries >= max_retries {
                        error!(
                            "{} failed after {} retries: {}",
                            operation_name, retries, e
                        );
                        return Err(e);
                    }

                    let wait_ms = match &e {
                        LlmError::RateLimited {
                            retry_after: Some(secs),
                        } => secs.saturating_mul(1000),
                        _ => backoff_ms,
                    }
                    .min(max_backoff_ms);

                    warn!(
                        "{} failed ({}), retrying in {}ms (attempt {}/{})",
                        operation_name,
                        e,
                        wait_ms,
                        retries + 1,
                        max_retries
                    );

                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    retries += 1;
                    backoff_ms = backoff_ms.saturating_mul(2).min(max_backoff_ms);
                }
                Err(e) => {
                    if retries > 0 {
                        info!(
                            "{} failed after {} retries: {}",
                            operation_name, retries, e
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    pub async fn chat_completion(&self, messages: Vec<ChatMessage>) -> LlmResult<String> {
        self.with_retry(
            || async { self.chat_completion_inner(messages.clone()).await },
            "chat_completion",
        )
        .await
    }

    async fn chat_completion_inner(&self, messages: Vec<ChatMessage>) -> LlmResult<String> {
        debug!(
            "Creating chat completion with {} messages, model {}",
            messages.len(),
            self.config.model
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: Some(false),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let chat_response: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                model = %chat_response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| {
                if c.finish_reason.as_deref() == Some("length") {
                    warn!(id = %chat_response.id, "Completion truncated at max_tokens");
                }
                c.message.content
            })
            .ok_or_else(|| LlmError::Api {
                message: "No completion returned".to_string(),
                status_code: None,
            })
    }

    /// Map a non-success response to the matching error variant.
    async fn check_status(response: Response) -> LlmResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            warn!("Rate limited by chat API");
            return Err(LlmError::RateLimited { retry_after });
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&error_text) {
            Ok(error_resp) => {
                error!(
                    "Chat API error: {} (type: {:?})",
                    error_resp.error.message, error_resp.error.error_type
                );
                error_resp.error.message
            }
            Err(_) => error_text,
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Unauthorized(message));
        }

        Err(LlmError::Api {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Send a trivial prompt to confirm the key and model are accepted.
    pub async fn ping(&self) -> LlmResult<()> {
        let reply = self.chat_completion(vec![ChatMessage::user("test")]).await?;
        debug!(reply_length = reply.len(), "Chat API reachable");
        Ok(())
    }
}

#[async_trait]
impl Generator for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let content = self
            .chat_completion(vec![ChatMessage::user(prompt)])
            .await?;
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
