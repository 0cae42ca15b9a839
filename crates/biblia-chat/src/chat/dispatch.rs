use futures::StreamExt;
use std::time::Duration;

use biblia_llm_api::{ChatSession, ProviderError};

use crate::chat::retry::RetryPolicy;

/// What a streaming send reports to its caller, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A non-empty piece of the reply
    Fragment(String),

    /// The current attempt failed with a retryable error. Every fragment
    /// delivered since the previous `Retrying` (or since the send began)
    /// belongs to the failed attempt; the whole message is re-sent after
    /// `delay`.
    Retrying {
        /// Number of the retry about to happen, starting at 1
        attempt: u32,
        max_retries: u32,
        delay: Duration,
    },
}

/// Send `message` on `session`, reporting fragments through `on_event` and
/// re-issuing the whole send on transient failures.
///
/// Fragments already delivered are never retracted. After the last allowed
/// attempt (or on the first fatal error) the error is returned unchanged.
pub async fn dispatch_stream<F>(
    session: &mut dyn ChatSession,
    message: &str,
    policy: &RetryPolicy,
    mut on_event: F,
) -> Result<(), ProviderError>
where
    F: FnMut(StreamEvent),
{
    let mut attempt: u32 = 0;

    loop {
        let error = match stream_once(session, message, &mut on_event).await {
            Ok(fragments) => {
                log::debug!("Reply complete after {} fragment(s), attempt {}", fragments, attempt + 1);
                return Ok(());
            }
            Err(error) => error,
        };

        if !policy.is_retryable(&error) || attempt >= policy.max_retries {
            log::error!(
                "Error sending message to model provider after {} attempt(s): {}",
                attempt + 1,
                error
            );
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        log::warn!(
            "Model provider unavailable (attempt {}/{}): {}. Retrying in {}ms...",
            attempt + 1,
            policy.max_retries,
            error,
            delay.as_millis()
        );

        on_event(StreamEvent::Retrying {
            attempt: attempt + 1,
            max_retries: policy.max_retries,
            delay,
        });

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// One attempt: open the stream and drain it. Returns how many fragments
/// were delivered.
async fn stream_once<F>(
    session: &mut dyn ChatSession,
    message: &str,
    on_event: &mut F,
) -> Result<usize, ProviderError>
where
    F: FnMut(StreamEvent),
{
    let mut stream = session.send_stream(message).await?;
    let mut delivered = 0;

    while let Some(item) = stream.next().await {
        let fragment = item?;
        if fragment.is_empty() {
            continue;
        }
        delivered += 1;
        on_event(StreamEvent::Fragment(fragment.text));
    }

    Ok(delivered)
}
