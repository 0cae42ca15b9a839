use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

use biblia_chat::{ChatClient, StreamEvent};
use biblia_llm_api::ProviderError;
use biblia_types::{BibleVersion, Message, MessageStatus, Role};

use crate::app::setup::{open_transcript, AppConfig};
use crate::cli::Cli;
use crate::conversation_logger::ConversationLogger;

/// A line typed at the prompt
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Exit,
    Help,
    Summary,
    Reset,
    ShowVersion,
    SetVersion(&'a str),
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_command(line: &str) -> ReplCommand<'_> {
    match line {
        "exit" | "quit" => ReplCommand::Exit,
        "/help" => ReplCommand::Help,
        "/summary" => ReplCommand::Summary,
        "/reset" => ReplCommand::Reset,
        "/version" => ReplCommand::ShowVersion,
        _ => {
            if let Some(code) = line.strip_prefix("/version ") {
                ReplCommand::SetVersion(code.trim())
            } else if line.starts_with('/') {
                ReplCommand::Unknown(line)
            } else {
                ReplCommand::Message(line)
            }
        }
    }
}

fn print_help() {
    println!("{} Commands:", "📖".bright_cyan());
    println!("  /summary          - Summarize the conversation so far");
    println!("  /reset            - Start a new conversation");
    println!("  /version          - Show the current translation");
    println!("  /version <CODE>   - Switch translation (KJV, NKJV, NIV, ESV, NASB, NLT)");
    println!("  /help             - Show this help");
    println!("  exit, quit        - Leave");
}

/// Conversation state owned by the REPL: the chat client plus the local
/// transcript that seeds new sessions and feeds summaries
struct Conversation {
    client: ChatClient,
    transcript: Vec<Message>,
    translation: BibleVersion,
    logger: Option<ConversationLogger>,
}

impl Conversation {
    /// Open a session for the selected translation unless one is already
    /// open, so the client never falls back to its default translation
    async fn ensure_session(&mut self) -> Result<(), ProviderError> {
        if self.client.session().is_none() {
            self.client.initialize_chat(self.translation, &[]).await?;
        }
        Ok(())
    }

    async fn stream_reply(&mut self, text: &str) -> Result<String, ProviderError> {
        self.ensure_session().await?;

        print!("{} ", "Biblia:".bright_blue().bold());
        let _ = io::stdout().flush();

        let mut reply = String::new();
        let result = self
            .client
            .send_message_events(text, |event| match event {
                StreamEvent::Fragment(fragment) => {
                    print!("{}", fragment);
                    let _ = io::stdout().flush();
                    reply.push_str(&fragment);
                }
                StreamEvent::Retrying { attempt, max_retries, delay } => {
                    println!();
                    println!(
                        "{} Service busy, retrying ({}/{}) in {}s...",
                        "⏳".yellow(),
                        attempt,
                        max_retries,
                        delay.as_secs()
                    );
                    reply.clear();
                    print!("{} ", "Biblia:".bright_blue().bold());
                    let _ = io::stdout().flush();
                }
            })
            .await;
        println!("\n");

        result.map(|()| reply)
    }

    async fn send(&mut self, text: &str) {
        self.transcript.push(Message::user(text).with_status(MessageStatus::Pending));
        if let Some(logger) = &mut self.logger {
            logger.log(Role::User.as_str(), text, Some(self.translation.code())).await;
        }

        let result = self.stream_reply(text).await;

        // The pushed user message is the last entry until the reply lands
        let status = if result.is_ok() { MessageStatus::Sent } else { MessageStatus::Error };
        if let Some(user_message) = self.transcript.last_mut() {
            user_message.status = status;
        }

        match result {
            Ok(reply) => {
                if let Some(logger) = &mut self.logger {
                    logger.log(Role::Assistant.as_str(), &reply, Some(self.translation.code())).await;
                }
                self.transcript.push(Message::assistant(reply));
            }
            Err(e) => {
                eprintln!("{} {}\n", "Error:".bright_red().bold(), e);
                if let Some(logger) = &mut self.logger {
                    logger.log_error(&e.to_string()).await;
                }
            }
        }
    }

    async fn summarize(&self) {
        match self.client.generate_chat_summary(&self.transcript).await {
            Ok(summary) => println!("{}\n{}\n", "📝 Summary".bright_cyan().bold(), summary),
            Err(e) => eprintln!("{} Summary failed: {}\n", "❌".bright_red(), e),
        }
    }

    async fn reset(&mut self) {
        self.client.reset_chat();
        self.transcript.clear();
        match self.ensure_session().await {
            Ok(()) => println!("{} Started a new conversation\n", "✨".bright_green()),
            Err(e) => eprintln!("{} Could not open a new session yet: {}\n", "⚠️".yellow(), e),
        }
    }

    /// Re-open the session for another translation, replaying the transcript
    async fn switch_version(&mut self, code: &str) {
        let version = match code.parse::<BibleVersion>() {
            Ok(version) => version,
            Err(e) => {
                eprintln!("{} {}", "❌".bright_red(), e);
                return;
            }
        };

        match self.client.initialize_chat(version, &self.transcript).await {
            Ok(_) => {
                self.translation = version;
                println!("{} Now quoting the {}\n", "📖".bright_green(), version.display_name());
            }
            Err(e) => eprintln!("{} Could not switch translation: {}", "❌".bright_red(), e),
        }
    }
}

/// Run interactive REPL mode
pub async fn run_repl_mode(cli: &Cli, app_config: AppConfig) -> Result<()> {
    println!("{}", "📖 Biblia AI - Bible study with citations".bright_cyan().bold());
    println!(
        "{}",
        format!(
            "Model: {} • Translation: {}",
            app_config.gemini.model,
            app_config.translation.display_name()
        )
        .bright_black()
    );
    println!("{}", "Type '/help' for commands, 'exit' or 'quit' to leave\n".bright_black());

    let mut conversation = Conversation {
        client: app_config.chat_client(),
        transcript: Vec::new(),
        translation: app_config.translation,
        logger: open_transcript(cli).await,
    };

    // Open the session up front so a bad key shows before the first question
    if let Err(e) = conversation.ensure_session().await {
        eprintln!("{} Could not open a session yet: {}", "⚠️".yellow(), e);
    }

    let mut rl = DefaultEditor::new()?;

    loop {
        let indicator = format!("[{}]", conversation.translation).bright_magenta();
        let readline = rl.readline(&format!("{} {} ", indicator, "You:".bright_green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match parse_command(line) {
                    ReplCommand::Exit => {
                        println!("{}", "Grace and peace!".bright_cyan());
                        break;
                    }
                    ReplCommand::Help => print_help(),
                    ReplCommand::Summary => conversation.summarize().await,
                    ReplCommand::Reset => conversation.reset().await,
                    ReplCommand::ShowVersion => println!(
                        "{} {} ({})",
                        "📖".bright_cyan(),
                        conversation.translation.display_name(),
                        conversation.translation
                    ),
                    ReplCommand::SetVersion(code) => conversation.switch_version(code).await,
                    ReplCommand::Unknown(command) => {
                        eprintln!("{} Unknown command '{}'. Type /help", "❌".bright_red(), command)
                    }
                    ReplCommand::Message(text) => conversation.send(text).await,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Grace and peace!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".bright_red().bold(), err);
                break;
            }
        }
    }

    if let Some(logger) = &mut conversation.logger {
        logger.shutdown().await;
    }

    Ok(())
}
