//! Command-line front-end for Biblia AI
//!
//! Wires the Gemini provider and the chat client into an interactive REPL,
//! a one-shot `ask` mode and a transcript `summarize` mode.

pub mod app;
pub mod cli;
mod conversation_logger;

pub use cli::{Cli, Commands};
pub use conversation_logger::ConversationLogger;
