//! Runtime configuration for storage and the AI gateway.
//!
//! # Responsibility
//! - Resolve storage locations and AI endpoint settings from injected values
//!   or `MINOTAS_*` environment variables.
//!
//! # Invariants
//! - The AI API key has no built-in default; startup fails fast without it.
//! - `Debug` output never includes the API key.

use crate::repo::kv_note_repo::DEFAULT_NOTES_KEY;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_AI_API_KEY: &str = "MINOTAS_AI_API_KEY";
pub const ENV_AI_BASE_URL: &str = "MINOTAS_AI_BASE_URL";
pub const ENV_AI_MODEL: &str = "MINOTAS_AI_MODEL";
pub const ENV_AI_MAX_OUTPUT_TOKENS: &str = "MINOTAS_AI_MAX_OUTPUT_TOKENS";
pub const ENV_AI_TIMEOUT_SECS: &str = "MINOTAS_AI_TIMEOUT_SECS";
pub const ENV_DB_PATH: &str = "MINOTAS_DB_PATH";
pub const ENV_KV_DIR: &str = "MINOTAS_KV_DIR";

pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Database file name used when callers do not configure a path.
pub const DEFAULT_DB_FILE_NAME: &str = "notas.db";

const DEFAULT_KV_DIR_NAME: &str = "minotas_kv";

/// Configuration error raised while resolving settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key is absent or blank.
    MissingApiKey,
    /// A numeric setting could not be parsed or is zero.
    InvalidNumber { name: &'static str, value: String },
    /// Base URL is not an http(s) URL.
    InvalidBaseUrl(String),
    /// HTTP client could not be built with the configured timeout.
    HttpClient(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(
                f,
                "AI API key is not configured; set {ENV_AI_API_KEY} or inject it at build time"
            ),
            Self::InvalidNumber { name, value } => {
                write!(f, "`{name}` must be a positive integer, got `{value}`")
            }
            Self::InvalidBaseUrl(value) => {
                write!(f, "AI base URL must start with http:// or https://, got `{value}`")
            }
            Self::HttpClient(message) => write!(f, "failed to build AI HTTP client: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for the remote generative-text endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AiConfig {
    api_key: String,
    /// Endpoint root without trailing slash, e.g. `.../v1beta`.
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl AiConfig {
    /// Builds a config from an injected key with default endpoint settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: DEFAULT_AI_TIMEOUT,
        })
    }

    /// Resolves the config from `MINOTAS_AI_*` environment variables.
    ///
    /// # Errors
    /// - `MissingApiKey` when `MINOTAS_AI_API_KEY` is unset or blank.
    /// - `InvalidNumber`/`InvalidBaseUrl` when overrides are malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the config through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(ENV_AI_API_KEY).unwrap_or_default())?;

        if let Some(base_url) = non_empty(lookup(ENV_AI_BASE_URL)) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(model) = non_empty(lookup(ENV_AI_MODEL)) {
            config.model = model;
        }
        if let Some(raw) = non_empty(lookup(ENV_AI_MAX_OUTPUT_TOKENS)) {
            config.max_output_tokens = parse_positive(ENV_AI_MAX_OUTPUT_TOKENS, &raw)? as u32;
        }
        if let Some(raw) = non_empty(lookup(ENV_AI_TIMEOUT_SECS)) {
            config.timeout = Duration::from_secs(parse_positive(ENV_AI_TIMEOUT_SECS, &raw)?);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `generateContent` URL without the key query parameter.
    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Debug for AiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Storage locations for both persistence strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// SQLite database file (relational strategy).
    pub db_path: PathBuf,
    /// Directory holding key-value slots (fallback strategy).
    pub kv_dir: PathBuf,
    /// Slot name holding the encoded note collection.
    pub kv_key: String,
}

impl StorageConfig {
    /// Places both stores under `dir` with default file and slot names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            db_path: dir.join(DEFAULT_DB_FILE_NAME),
            kv_dir: dir.join(DEFAULT_KV_DIR_NAME),
            kv_key: DEFAULT_NOTES_KEY.to_string(),
        }
    }

    /// Resolves from `MINOTAS_DB_PATH` / `MINOTAS_KV_DIR`, defaulting into the
    /// system temp directory.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::in_dir(std::env::temp_dir());
        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = non_empty(lookup(ENV_KV_DIR)) {
            config.kv_dir = PathBuf::from(dir);
        }
        config
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 && value <= u64::from(u32::MAX) => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}
