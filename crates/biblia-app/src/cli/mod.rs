use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use biblia_types::BibleVersion;

/// CLI arguments for biblia
#[derive(Parser, Debug)]
#[command(name = "biblia")]
#[command(about = "Biblia AI - scripture-grounded Bible study chat")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,

    /// Bible translation to quote from (KJV, NKJV, NIV, ESV, NASB, NLT)
    #[arg(long, short = 't', value_name = "CODE", default_value = "ESV", env = "BIBLIA_TRANSLATION")]
    pub translation: BibleVersion,

    /// Override the Gemini model name
    #[arg(long, value_name = "MODEL", env = "BIBLIA_MODEL")]
    pub model: Option<String>,

    /// Override the Gemini API base URL (e.g., http://localhost:8080/v1beta)
    #[arg(long, value_name = "URL", env = "BIBLIA_API_URL")]
    pub api_url: Option<String>,

    /// Write every request body (API key masked) to DIR, or to
    /// ~/.biblia/logs when no directory is given
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub log_requests: Option<Option<PathBuf>>,

    /// Append the conversation as JSON lines to a file in this directory
    #[arg(long, value_name = "DIR")]
    pub transcript: Option<PathBuf>,

    /// Enable verbose debug output (RUST_LOG still takes precedence)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Ask a single question and stream the answer
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Summarize a saved conversation (a JSON array of messages)
    Summarize {
        /// Path to the JSON transcript
        file: PathBuf,
    },
}

impl Cli {
    /// Default log filter when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
