//! Conversation management for biblia
//!
//! This crate turns a model provider into a scripture-grounded chat: it
//! formats stored messages into provider context, opens sessions with the
//! Biblia AI system instruction, streams replies with retry and backoff on
//! transient failures, and produces transcript summaries.

pub mod chat;
mod client;

pub use client::ChatClient;

// Re-export commonly used items
pub use chat::dispatch::{dispatch_stream, StreamEvent};
pub use chat::history::{format_history, is_context_message};
pub use chat::prompt::{summary_prompt, system_instruction};
pub use chat::retry::{default_is_retryable, RetryClassifier, RetryPolicy};
pub use chat::session::{create_session, SessionHandle};
pub use chat::summary::{generate_summary, render_transcript, EMPTY_TRANSCRIPT_SUMMARY, SUMMARY_FALLBACK};
