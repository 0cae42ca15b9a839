// Logging helpers - request/response capture for debugging provider calls
pub mod request_logger;

use std::path::PathBuf;
use anyhow::{Result, Context};

pub use request_logger::{
    log_request,
    log_request_to_file,
    log_response_to_file,
    log_stream_chunk,
    log_timestamp,
};

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Mask a secret so only its first few characters end up in logs
pub fn mask_secret(secret: &str) -> String {
    format!("{}***", secret.chars().take(6).collect::<String>())
}

/// Get or create the base biblia directory (~/.biblia)
pub fn get_biblia_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Failed to get home directory")?;

    let biblia_dir = PathBuf::from(home_dir).join(".biblia");

    if !biblia_dir.exists() {
        std::fs::create_dir_all(&biblia_dir)
            .context("Failed to create biblia directory")?;
    }

    Ok(biblia_dir)
}

/// Get or create the logs directory (~/.biblia/logs)
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = get_biblia_dir()?.join("logs");

    if !logs_dir.exists() {
        std::fs::create_dir_all(&logs_dir)
            .context("Failed to create logs directory")?;
    }

    Ok(logs_dir)
}
