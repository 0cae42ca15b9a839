use anyhow::{Context, Result};
use std::sync::Arc;

use biblia_chat::ChatClient;
use biblia_logging::get_logs_dir;
use biblia_llm_api::{ChatProvider, ClientFactory, GeminiConfig};
use biblia_types::BibleVersion;

use crate::cli::Cli;
use crate::conversation_logger::ConversationLogger;

/// Application configuration derived from CLI arguments and environment
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub provider: Arc<dyn ChatProvider>,
    pub translation: BibleVersion,
}

impl AppConfig {
    pub fn chat_client(&self) -> ChatClient {
        ChatClient::new(Arc::clone(&self.provider))
    }
}

/// Set up application configuration from CLI arguments.
///
/// Precedence: CLI flags > BIBLIA_* env > defaults. The API key only comes
/// from the environment (GEMINI_API_KEY, then API_KEY).
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let mut gemini = ClientFactory::config_from_env().context("Gemini is not configured")?;

    if let Some(model) = &cli.model {
        gemini = gemini.with_model(model.as_str());
    }

    if let Some(url) = &cli.api_url {
        gemini = gemini.with_base_url(url).context("Invalid --api-url")?;
    }

    let request_log_dir = match &cli.log_requests {
        Some(Some(dir)) => Some(dir.clone()),
        Some(None) => Some(get_logs_dir()?),
        None => None,
    };
    gemini = gemini.with_request_log_dir(request_log_dir);
    log::debug!("Using {:?}", gemini);

    Ok(AppConfig {
        provider: ClientFactory::create(gemini.clone()),
        gemini,
        translation: cli.translation,
    })
}

/// Open the transcript logger when `--transcript` was given; failures only
/// disable logging
pub async fn open_transcript(cli: &Cli) -> Option<ConversationLogger> {
    let dir = cli.transcript.as_ref()?;
    match ConversationLogger::new(dir).await {
        Ok(logger) => {
            log::info!("Writing transcript to {}", logger.file_path().display());
            Some(logger)
        }
        Err(e) => {
            eprintln!("Transcript logging disabled: {:#}", e);
            None
        }
    }
}
