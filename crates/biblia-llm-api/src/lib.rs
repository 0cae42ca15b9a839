//! # biblia-llm-api
//!
//! Provider layer for biblia: the abstract chat capability the rest of the
//! workspace talks to, and a Gemini implementation of it.
//!
//! ## Features
//!
//! - **Provider traits**: [`ChatProvider`] opens sessions and runs one-shot
//!   generations; [`ChatSession`] streams replies as [`Fragment`]s
//! - **Gemini client**: REST + SSE streaming against `generativelanguage.googleapis.com`
//! - **Environment configuration**: `GEMINI_API_KEY`, `BIBLIA_MODEL`, `BIBLIA_API_URL`
//!
//! ## Example
//!
//! ```rust,no_run
//! use biblia_llm_api::{ClientFactory, SessionConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = ClientFactory::from_env(None)?;
//!     let mut session = provider
//!         .create_session(SessionConfig {
//!             system_instruction: "Answer from scripture.".to_string(),
//!             temperature: 0.3,
//!             history: vec![],
//!         })
//!         .await?;
//!
//!     let mut fragments = session.send_stream("What is faith?").await?;
//!     while let Some(fragment) = fragments.next().await {
//!         print!("{}", fragment?.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;


// Re-export commonly used types
pub use client::{
    ChatProvider,
    ChatSession,
    Fragment,
    FragmentStream,
    ProviderError,
    SessionConfig,
};
pub use client::gemini::{GeminiClient, GeminiSession};

pub use config::{
    ClientFactory,
    ConfigError,
    GeminiConfig,
    DEFAULT_MODEL,
    GEMINI_API_URL,
    normalize_base_url,
    normalize_model_name,
};
