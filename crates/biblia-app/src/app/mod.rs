pub mod repl;
pub mod setup;
pub mod task;

pub use repl::run_repl_mode;
pub use setup::{setup_from_cli, AppConfig};
pub use task::{run_ask_mode, run_summarize_mode};
