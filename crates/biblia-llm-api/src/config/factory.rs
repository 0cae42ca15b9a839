use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{gemini::GeminiClient, ChatProvider};
use crate::config::{ConfigError, GeminiConfig, API_KEY_ENV_VARS, API_URL_ENV_VAR, MODEL_ENV_VAR};

/// Client factory for creating model providers
pub struct ClientFactory;

impl ClientFactory {
    /// Create a provider from explicit configuration
    pub fn create(config: GeminiConfig) -> Arc<dyn ChatProvider> {
        Arc::new(GeminiClient::new(config))
    }

    /// Create a provider configured from the process environment
    ///
    /// Reads the API key from `GEMINI_API_KEY` (falling back to `API_KEY`),
    /// plus the optional `BIBLIA_MODEL` and `BIBLIA_API_URL` overrides.
    pub fn from_env(request_log_dir: Option<PathBuf>) -> Result<Arc<dyn ChatProvider>, ConfigError> {
        let config = Self::config_from_env()?.with_request_log_dir(request_log_dir);
        Ok(Self::create(config))
    }

    /// Build a [`GeminiConfig`] from environment variables only
    pub fn config_from_env() -> Result<GeminiConfig, ConfigError> {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| non_empty_var(name))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = GeminiConfig::new(api_key);

        if let Some(model) = non_empty_var(MODEL_ENV_VAR) {
            config = config.with_model(model);
        }

        if let Some(url) = non_empty_var(API_URL_ENV_VAR) {
            config = config.with_base_url(&url)?;
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
