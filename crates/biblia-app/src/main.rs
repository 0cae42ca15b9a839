use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io;

use biblia::app::{run_ask_mode, run_repl_mode, run_summarize_mode, setup_from_cli};
use biblia::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    if let Some(shell) = cli.generate {
        clap_complete::generate(shell, &mut Cli::command(), "biblia", &mut io::stdout());
        return Ok(());
    }

    // Set up application configuration from CLI
    let app_config = setup_from_cli(&cli)?;

    match &cli.command {
        Some(Commands::Ask { question }) => run_ask_mode(&cli, app_config, &question.join(" ")).await,
        Some(Commands::Summarize { file }) => run_summarize_mode(app_config, file).await,
        None => run_repl_mode(&cli, app_config).await,
    }
}
