use async_trait::async_trait;
use biblia_types::HistoryEntry;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

pub mod gemini;

/// One incremental piece of generated text from a streaming response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub text: String,
    pub finish_reason: Option<String>,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Pull-based sequence of fragments: each poll yields the next fragment,
/// the end of the response, or the error that broke the stream.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, ProviderError>> + Send>>;

/// Failure reported by a model provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The connection broke or an error event arrived mid-stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response could not be understood
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ProviderError::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, when the provider reported one
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider-supplied message text, without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Api { message, .. } => message,
            ProviderError::Stream(message)
            | ProviderError::Transport(message)
            | ProviderError::Decode(message) => message,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => ProviderError::api(status.as_u16(), e.to_string()),
            None if e.is_decode() => ProviderError::Decode(e.to_string()),
            None => ProviderError::Transport(e.to_string()),
        }
    }
}

/// Everything a provider needs to open a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub system_instruction: String,
    pub temperature: f32,
    pub history: Vec<HistoryEntry>,
}

/// An open conversation that accumulates prior turns on the provider side
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one user message and return the reply as a fragment stream.
    ///
    /// Errors may surface either here or from any item of the stream.
    async fn send_stream(&mut self, message: &str) -> Result<FragmentStream, ProviderError>;

    /// Conversation turns the session currently holds
    fn history(&self) -> Vec<HistoryEntry>;
}

/// Model provider capability: open sessions and run one-shot generations
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Open a new conversation; this never reuses an existing session
    async fn create_session(&self, config: SessionConfig) -> Result<Box<dyn ChatSession>, ProviderError>;

    /// Single non-streaming generation with no conversational state.
    /// Returns `None` when the provider produced no text.
    async fn generate_once(&self, prompt: &str) -> Result<Option<String>, ProviderError>;
}
