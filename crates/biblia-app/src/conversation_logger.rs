use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO-8601 local time
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    translation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_error: Option<bool>,
}

/// Appends a chat transcript to a JSON-lines file
pub struct ConversationLogger {
    file_path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl ConversationLogger {
    /// Create a new logger in `dir`; the file name is based on the current local time.
    pub async fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create transcript directory {}", dir.display()))?;

        let filename = format!("biblia-{}.jsonl", Local::now().format("%Y-%m-%d-%H%M%S"));
        let file_path = dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .with_context(|| format!("Failed to open transcript {}", file_path.display()))?;

        Ok(Self {
            file_path,
            file: Some(file),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Append a single message.
    pub async fn log(&mut self, role: &str, content: &str, translation: Option<&str>) {
        self.write_entry(LogEntry {
            timestamp: Local::now().to_rfc3339(),
            role,
            content,
            translation,
            is_error: None,
        })
        .await;
    }

    /// Append a failed exchange so the transcript shows where replies are missing
    pub async fn log_error(&mut self, content: &str) {
        self.write_entry(LogEntry {
            timestamp: Local::now().to_rfc3339(),
            role: "error",
            content,
            translation: None,
            is_error: Some(true),
        })
        .await;
    }

    async fn write_entry(&mut self, entry: LogEntry<'_>) {
        let Some(file) = &mut self.file else {
            return;
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not encode transcript entry: {}", e);
                return;
            }
        };

        if let Err(e) = file.write_all(format!("{}\n", json).as_bytes()).await {
            eprintln!("[Logging error] {}", e);
        } else {
            let _ = file.flush().await;
        }
    }

    /// Close the logger (explicit drop). Called on graceful shutdown.
    pub async fn shutdown(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all().await;
        }
    }
}
