use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use biblia_logging::mask_secret;

pub mod factory;
pub use factory::ClientFactory;

/// Default Gemini REST endpoint (API version root)
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for both chat and summaries
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variables holding the API credential, in lookup order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Environment variable overriding the model name
pub const MODEL_ENV_VAR: &str = "BIBLIA_MODEL";

/// Environment variable overriding the API base URL
pub const API_URL_ENV_VAR: &str = "BIBLIA_API_URL";

/// Configuration problems detected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API credential not set: export GEMINI_API_KEY (or API_KEY)")]
    MissingApiKey,

    #[error("invalid API URL '{0}': expected an http(s) URL")]
    InvalidApiUrl(String),
}

/// Connection settings for the Gemini API
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// When set, every request body is written here for debugging
    pub request_log_dir: Option<PathBuf>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_URL.to_string(),
            request_log_dir: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = normalize_model_name(&model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_request_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.request_log_dir = dir;
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_log_dir", &self.request_log_dir)
            .finish()
    }
}

/// Strip an optional `models/` prefix so the name can be placed in a URL path
pub fn normalize_model_name(model: &str) -> String {
    let model = model.trim();
    model.strip_prefix("models/").unwrap_or(model).to_string()
}

/// Normalize an API base URL to the version root, e.g.
/// `https://host/v1beta/` or `https://host/v1beta/models` -> `https://host/v1beta`
pub fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(url.to_string()));
    }

    let without_slash = trimmed.trim_end_matches('/');
    let root = without_slash.strip_suffix("/models").unwrap_or(without_slash);
    Ok(root.to_string())
}
