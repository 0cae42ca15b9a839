use std::sync::Arc;

use biblia_llm_api::{ChatProvider, ProviderError};
use biblia_types::{BibleVersion, Message};

use crate::chat::dispatch::{dispatch_stream, StreamEvent};
use crate::chat::retry::RetryPolicy;
use crate::chat::session::{create_session, SessionHandle};
use crate::chat::summary::generate_summary;

/// A chat front-end's view of the assistant: one provider, at most one open
/// session, and the retry policy used for streaming sends.
///
/// Sending needs `&mut self`, so sends against the session are serialized.
/// Independent clients can run side by side.
pub struct ChatClient {
    provider: Arc<dyn ChatProvider>,
    session: Option<SessionHandle>,
    retry_policy: RetryPolicy,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            session: None,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// The open session, if any
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// Open a new session, replacing any current one. On error the current
    /// session is left in place.
    pub async fn initialize_chat(
        &mut self,
        translation: BibleVersion,
        history: &[Message],
    ) -> Result<&SessionHandle, ProviderError> {
        let handle = create_session(self.provider.as_ref(), translation, history).await?;
        if let Some(previous) = self.session.take() {
            log::debug!("Replacing chat session {}", previous.id());
        }
        Ok(self.session.insert(handle))
    }

    /// Stream a reply to `message`, calling `on_chunk` for each non-empty
    /// fragment. Opens a default session (ESV, no history) if none is open.
    pub async fn send_message_stream<F>(&mut self, message: &str, mut on_chunk: F) -> Result<(), ProviderError>
    where
        F: FnMut(&str),
    {
        self.send_message_events(message, |event| {
            if let StreamEvent::Fragment(text) = event {
                on_chunk(&text);
            }
        })
        .await
    }

    /// Like [`send_message_stream`](Self::send_message_stream), but also
    /// reports each retry so the caller can drop partial output from the
    /// failed attempt.
    pub async fn send_message_events<F>(&mut self, message: &str, on_event: F) -> Result<(), ProviderError>
    where
        F: FnMut(StreamEvent),
    {
        let handle = match &mut self.session {
            Some(handle) => handle,
            slot @ None => {
                log::debug!("No open session; creating one with default settings");
                slot.insert(create_session(self.provider.as_ref(), BibleVersion::default(), &[]).await?)
            }
        };

        dispatch_stream(handle.session_mut(), message, &self.retry_policy, on_event).await
    }

    /// Drop the open session; the next send opens a fresh one
    pub fn reset_chat(&mut self) {
        if let Some(handle) = self.session.take() {
            log::debug!("Closed chat session {}", handle.id());
        }
    }

    /// Summarize `messages` without touching the open session
    pub async fn generate_chat_summary(&self, messages: &[Message]) -> Result<String, ProviderError> {
        generate_summary(self.provider.as_ref(), messages).await
    }
}
