use biblia_llm_api::{ChatProvider, ProviderError};
use biblia_types::Message;

use crate::chat::prompt::summary_prompt;

/// Returned for an empty transcript, without contacting the provider
pub const EMPTY_TRANSCRIPT_SUMMARY: &str = "No conversation to summarize.";

/// Returned when the provider answers with no text
pub const SUMMARY_FALLBACK: &str = "Could not generate summary.";

/// Render finalized messages as `ROLE: content` blocks separated by blank lines
pub fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|message| message.is_finalized())
        .map(|message| format!("{}: {}", message.role.as_str().to_uppercase(), message.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Summarize a transcript with a single stateless generation.
///
/// Uses `generate_once`, so no chat session is created or touched. There is
/// no retry; provider errors are returned as-is.
pub async fn generate_summary(provider: &dyn ChatProvider, messages: &[Message]) -> Result<String, ProviderError> {
    if messages.is_empty() {
        return Ok(EMPTY_TRANSCRIPT_SUMMARY.to_string());
    }

    let prompt = summary_prompt(&render_transcript(messages));
    log::debug!("Requesting summary of {} messages ({} bytes)", messages.len(), prompt.len());

    match provider.generate_once(&prompt).await {
        Ok(Some(text)) if !text.is_empty() => Ok(text),
        Ok(_) => {
            log::warn!("Summary request returned no text");
            Ok(SUMMARY_FALLBACK.to_string())
        }
        Err(e) => {
            log::error!("Summary generation failed: {}", e);
            Err(e)
        }
    }
}
