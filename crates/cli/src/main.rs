//! DocBot CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Create the config file
//! - `run`     — Start the bot on the terminal transport
//! - `ask`     — Answer a single question
//! - `doctor`  — Diagnose configuration

use clap::{Parser, Subcommand};

mod commands {
    pub mod ask;
    pub mod doctor;
    pub mod onboard;
    pub mod run;
    pub mod setup;
}

#[derive(Parser)]
#[command(
    name = "docbot",
    about = "DocBot — answers questions about your documentation",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.docbot/config.toml with defaults
    Onboard,

    /// Start the bot and chat from the terminal
    Run,

    /// Answer a single question and exit
    Ask {
        /// The question
        #[arg(short, long)]
        message: String,
    },

    /// Diagnose configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Ask { message } => commands::ask::run(&message).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
