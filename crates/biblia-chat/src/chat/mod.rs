// Chat module - context formatting, sessions, streaming and summaries
pub mod dispatch;
pub mod history;
pub mod prompt;
pub mod retry;
pub mod session;
pub mod summary;
