//! Configuration loading
//!
//! Settings come from `.storyforge.toml` (see [`StudioConfig::load`]) and are
//! then overridden by environment variables. The resulting value is built
//! once at startup and shared read-only afterwards.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".storyforge.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/storyforge/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("storyforge").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Errors raised by [`StudioConfig::validate`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {service} url '{url}': {reason}")]
    InvalidUrl {
        service: &'static str,
        url: String,
        reason: String,
    },

    #[error("temperature must be within 0.0..=2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Top-level configuration (from .storyforge.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    /// Model used by the prompt generator and the artist
    #[serde(default = "default_model")]
    pub model: String,
    /// Small model for lightweight checks; falls back to `model`
    #[serde(default)]
    pub mini_model: Option<String>,
    /// Model used by the researcher and the writer; falls back to `model`
    #[serde(default)]
    pub researcher_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn mini_model(&self) -> &str {
        self.mini_model.as_deref().unwrap_or(&self.model)
    }

    pub fn researcher_model(&self) -> &str {
        self.researcher_model.as_deref().unwrap_or(&self.model)
    }
}

/// Image backend section (OpenAI-compatible images API)
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_api_url")]
    pub api_url: String,
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_image_quality")]
    pub quality: String,
    #[serde(default = "default_image_style")]
    pub style: String,
    /// Never read from the file; only set from OPENAI_API_KEY
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl ImageConfig {
    /// The image backend is only used when an API key is present
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Web search section (SearXNG); search is off without a URL
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// Comma-separated SearXNG engine list
    #[serde(default)]
    pub engines: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Artifact output section
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Default for requests that do not say whether to save markdown
    #[serde(default = "default_save_markdown")]
    pub save_markdown: bool,
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:14b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_image_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_quality() -> String {
    "hd".to_string()
}

fn default_image_style() -> String {
    "vivid".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_save_markdown() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
            mini_model: None,
            researcher_model: None,
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_url: default_image_api_url(),
            model: default_image_model(),
            size: default_image_size(),
            quality: default_image_quality(),
            style: default_image_style(),
            api_key: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: None,
            engines: None,
            max_results: default_max_results(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            save_markdown: default_save_markdown(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl StudioConfig {
    /// Load config from .storyforge.toml and apply environment overrides
    ///
    /// The result is not validated; call [`StudioConfig::validate`] once
    /// logging is up.
    ///
    /// Search order:
    /// 1. Walk up directory tree from cwd looking for .storyforge.toml
    /// 2. Check ~/.config/storyforge/.storyforge.toml (global fallback)
    /// 3. Fall back to defaults
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file(CONFIG_FILE) {
            Some(config_path) => {
                tracing::debug!("Loading config from: {}", config_path.display());
                Self::load_from_path(&config_path)?
            }
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from a specific path (no environment overrides)
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Parse from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by tests)
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.url = url;
        }
        if let Some(model) = lookup("DEFAULT_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("MINI_MODEL") {
            self.llm.mini_model = Some(model);
        }
        if let Some(model) = lookup("RESEARCHER_MODEL") {
            self.llm.researcher_model = Some(model);
        }
        if let Some(value) = lookup("TEMPERATURE") {
            self.llm.temperature = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "TEMPERATURE",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("MAX_TOKENS") {
            let max: u32 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MAX_TOKENS",
                value: value.clone(),
            })?;
            // 0 means "no limit"
            self.llm.max_tokens = (max > 0).then_some(max);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.images.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(url) = lookup("SEARXNG_URL") {
            self.search.url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    /// Check that required settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("LLM", &self.llm.url)?;
        if let Some(url) = self.search.url.as_deref().filter(|u| !u.is_empty()) {
            check_url("search", url)?;
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidTemperature(self.llm.temperature));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if !self.images.is_enabled() {
            tracing::warn!("OPENAI_API_KEY not set - the artist will return image descriptions instead of URLs");
        }

        Ok(())
    }
}

fn check_url(service: &'static str, url: &str) -> Result<(), ConfigError> {
    url::Url::parse(url).map(|_| ()).map_err(|e| ConfigError::InvalidUrl {
        service,
        url: url.to_string(),
        reason: e.to_string(),
    })
}
