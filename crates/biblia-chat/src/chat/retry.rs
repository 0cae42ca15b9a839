use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use biblia_llm_api::ProviderError;
use biblia_types::{BASE_RETRY_DELAY_MS, MAX_RETRIES};

/// Decides whether a provider failure is worth another attempt
pub type RetryClassifier = Arc<dyn Fn(&ProviderError) -> bool + Send + Sync>;

/// Message fragments that mark a failure as transient (server overloaded or
/// briefly unavailable)
const RETRYABLE_MARKERS: [&str; 4] = ["503", "500", "overloaded", "unavailable"];

/// Default classification: status 500/503, or a message mentioning either
/// code, "overloaded" or "unavailable".
///
/// Matching is case-insensitive since Gemini reports `UNAVAILABLE` in its
/// status field and "unavailable" in prose.
pub fn default_is_retryable(error: &ProviderError) -> bool {
    if matches!(error.status(), Some(500) | Some(503)) {
        return true;
    }

    let message = error.message().to_lowercase();
    RETRYABLE_MARKERS.iter().any(|marker| message.contains(marker))
}

/// How many times a failed send is re-issued and how long to wait between
/// attempts
#[derive(Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following one
    pub base_delay: Duration,
    classifier: RetryClassifier,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            classifier: Arc::new(default_is_retryable),
        }
    }

    /// Replace the retryable/fatal predicate, e.g. with one keyed on a
    /// provider's structured error codes
    pub fn with_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&ProviderError) -> bool + Send + Sync + 'static,
    {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn is_retryable(&self, error: &ProviderError) -> bool {
        (self.classifier)(error)
    }

    /// Backoff before retry number `attempt + 1`: `base_delay * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, Duration::from_millis(BASE_RETRY_DELAY_MS))
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}
