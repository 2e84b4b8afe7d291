use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use llm::ChatClientConfig;
use orchestrator::{RevisionPolicy, DEFAULT_APPROVAL_THRESHOLD, DEFAULT_MAX_ITERATIONS};
use search::TavilyConfig;
use serde::{Deserialize, Serialize};

pub const STUDIO_DIR: &str = ".film-studio";
pub const CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "film-studio";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: llm::DEFAULT_BASE_URL.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: search::DEFAULT_BASE_URL.to_string(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub approval_threshold: u8,
    pub max_iterations: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl StudioConfig {
    /// Resolve the config file to use.
    ///
    /// An explicit path must exist. Otherwise the project file in `cwd` is
    /// tried, then the user config directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let candidates = [Some(Self::project_path(cwd)), Self::user_path()];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: StudioConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn project_path(cwd: &Path) -> PathBuf {
        cwd.join(STUDIO_DIR).join(CONFIG_FILE)
    }

    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn policy(&self) -> Result<RevisionPolicy> {
        Ok(RevisionPolicy::new(
            self.pipeline.approval_threshold,
            self.pipeline.max_iterations,
        )?)
    }

    pub fn chat_client_config(&self, api_key: &str) -> ChatClientConfig {
        let mut config = ChatClientConfig::new(api_key)
            .with_base_url(&self.llm.base_url)
            .with_model(&self.llm.model)
            .with_timeout(Duration::from_secs(self.llm.timeout_secs))
            .with_max_retries(self.llm.max_retries);
        config.temperature = Some(self.llm.temperature);
        config.max_tokens = Some(self.llm.max_tokens);
        config
    }

    pub fn tavily_config(&self, api_key: &str) -> TavilyConfig {
        TavilyConfig::new(api_key)
            .with_base_url(&self.search.base_url)
            .with_max_results(self.search.max_results)
            .with_timeout(Duration::from_secs(self.search.timeout_secs))
    }
}
