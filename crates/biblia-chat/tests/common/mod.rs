#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use biblia_llm_api::{ChatProvider, ChatSession, Fragment, FragmentStream, ProviderError, SessionConfig};
use biblia_types::HistoryEntry;

/// Scripted outcome of one `send_stream` call
#[derive(Debug, Clone)]
pub enum Attempt {
    /// Stream these fragments, then end normally
    Reply(Vec<&'static str>),
    /// Fail before any fragment is produced
    FailOnSend(ProviderError),
    /// Stream some fragments, then fail
    FailMidStream(Vec<&'static str>, ProviderError),
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<Attempt>>,
    send_times: Mutex<Vec<Instant>>,
    sent_messages: Mutex<Vec<String>>,
}

/// Provider double that replays a script of attempts across all sessions it
/// opens and records what it was asked to do
#[derive(Default)]
pub struct MockProvider {
    shared: Arc<Shared>,
    sessions_created: AtomicUsize,
    session_configs: Mutex<Vec<SessionConfig>>,
    create_error: Mutex<Option<ProviderError>>,
    prompts: Mutex<Vec<String>>,
    generate_result: Mutex<Option<Result<Option<String>, ProviderError>>>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_script(script: Vec<Attempt>) -> Arc<Self> {
        let provider = Self::default();
        *provider.shared.script.lock().unwrap() = script.into();
        Arc::new(provider)
    }

    pub fn push_attempts(&self, attempts: Vec<Attempt>) {
        self.shared.script.lock().unwrap().extend(attempts);
    }

    pub fn fail_next_session(&self, error: ProviderError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub fn set_generate_result(&self, result: Result<Option<String>, ProviderError>) {
        *self.generate_result.lock().unwrap() = Some(result);
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    pub fn session_configs(&self) -> Vec<SessionConfig> {
        self.session_configs.lock().unwrap().clone()
    }

    pub fn send_times(&self) -> Vec<Instant> {
        self.shared.send_times.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.shared.sent_messages.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Gaps between consecutive sends, in milliseconds
    pub fn backoff_delays_ms(&self) -> Vec<u128> {
        self.send_times()
            .windows(2)
            .map(|pair| pair[1].duration_since(pair[0]).as_millis())
            .collect()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn create_session(&self, config: SessionConfig) -> Result<Box<dyn ChatSession>, ProviderError> {
        if let Some(error) = self.create_error.lock().unwrap().take() {
            return Err(error);
        }

        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        let history = config.history.clone();
        self.session_configs.lock().unwrap().push(config);

        Ok(Box::new(MockSession {
            shared: Arc::clone(&self.shared),
            history,
        }))
    }

    async fn generate_once(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.generate_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Some("- Summary".to_string())))
    }
}

struct MockSession {
    shared: Arc<Shared>,
    history: Vec<HistoryEntry>,
}

#[async_trait]
impl ChatSession for MockSession {
    async fn send_stream(&mut self, message: &str) -> Result<FragmentStream, ProviderError> {
        self.shared.send_times.lock().unwrap().push(Instant::now());
        self.shared.sent_messages.lock().unwrap().push(message.to_string());

        let attempt = self
            .shared
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Attempt::Reply(vec!["Amen"]));

        let items: Vec<Result<Fragment, ProviderError>> = match attempt {
            Attempt::Reply(fragments) => fragments.into_iter().map(|t| Ok(Fragment::new(t))).collect(),
            Attempt::FailOnSend(error) => return Err(error),
            Attempt::FailMidStream(fragments, error) => fragments
                .into_iter()
                .map(|t| Ok(Fragment::new(t)))
                .chain(std::iter::once(Err(error)))
                .collect(),
        };

        Ok(Box::pin(stream::iter(items)))
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.history.clone()
    }
}

pub fn overloaded() -> ProviderError {
    ProviderError::api(503, "The model is overloaded. Please try again later.")
}

pub fn unauthorized() -> ProviderError {
    ProviderError::api(401, "API key not valid. Please pass a valid API key.")
}
