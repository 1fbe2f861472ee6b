//! HelpBot CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the HTTP chat gateway
//! - `index` — Build the knowledge index from a corpus file (offline job)
//! - `ask`   — Send a single message without the HTTP layer (smoke test)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "helpbot",
    about = "HelpBot — retrieval-grounded customer support agent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat gateway
    Serve,

    /// Build the knowledge index from a plain-text corpus file
    Index {
        /// Corpus file, one or more paragraphs of plain text
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the index (defaults to the configured path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask a single question locally
    Ask {
        /// The message to send
        message: String,

        /// Session id to converse under
        #[arg(short, long, default_value = "local")]
        session: String,
    },
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

    let config = helpbot_config::AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => commands::serve::run(config).await?,
        Commands::Index { input, output } => commands::index::run(config, input, output).await?,
        Commands::Ask { message, session } => commands::ask::run(config, &session, &message).await?,
    }

    Ok(())
}
