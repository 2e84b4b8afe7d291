//! Chat-completion client for OpenAI-compatible endpoints (Groq by default).

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatClient, ChatClientConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{LlmError, LlmResult};
pub use types::*;
