use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

use biblia_chat::StreamEvent;
use biblia_types::{Message, Role};

use crate::app::setup::{open_transcript, AppConfig};
use crate::cli::Cli;

/// Ask a single question, stream the answer to stdout and exit
pub async fn run_ask_mode(cli: &Cli, app_config: AppConfig, question: &str) -> Result<()> {
    let mut client = app_config.chat_client();
    let mut logger = open_transcript(cli).await;
    let translation = app_config.translation;

    client
        .initialize_chat(translation, &[])
        .await
        .context("Failed to open chat session")?;

    if let Some(logger) = &mut logger {
        logger.log(Role::User.as_str(), question, Some(translation.code())).await;
    }

    let mut answer = String::new();
    let result = client
        .send_message_events(question, |event| match event {
            StreamEvent::Fragment(text) => {
                print!("{}", text);
                let _ = io::stdout().flush();
                answer.push_str(&text);
            }
            StreamEvent::Retrying { attempt, max_retries, delay } => {
                eprintln!(
                    "\n{} Service busy, retrying ({}/{}) in {}s...",
                    "⏳".yellow(),
                    attempt,
                    max_retries,
                    delay.as_secs()
                );
                answer.clear();
            }
        })
        .await;
    println!();

    if let Some(logger) = &mut logger {
        match &result {
            Ok(()) => logger.log(Role::Assistant.as_str(), &answer, Some(translation.code())).await,
            Err(e) => logger.log_error(&e.to_string()).await,
        }
        logger.shutdown().await;
    }

    result.context("Gemini request failed")
}

/// Summarize a JSON transcript (array of messages) and print the result
pub async fn run_summarize_mode(app_config: AppConfig, file: &Path) -> Result<()> {
    let messages = load_transcript(file).await?;
    let client = app_config.chat_client();

    println!(
        "{}",
        format!("Summarizing {} messages from {}", messages.len(), file.display()).bright_black()
    );

    let summary = client
        .generate_chat_summary(&messages)
        .await
        .context("Summary generation failed")?;
    println!("{}", summary);

    Ok(())
}

/// Read a transcript saved by a front-end: a JSON array of messages
pub async fn load_transcript(file: &Path) -> Result<Vec<Message>> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("{} is not a JSON array of messages", file.display()))
}
