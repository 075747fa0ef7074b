//! octoagent CLI — the main entry point.
//!
//! Commands:
//! - `chat`  — Interactive console or single-message mode
//! - `tools` — Print the available tool catalog
//!
//! Configuration errors and a tool server that will not start are the only
//! conditions that exit non-zero; everything inside a conversation turn
//! degrades to an answer instead.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "octoagent",
    about = "octoagent — a tool-calling agent for a single GitHub account",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (env vars still take precedence)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Use the remote tool server catalog instead of the built-in tools
        #[arg(long)]
        remote: bool,

        /// Run the multi-agent topology (repo/issue/user specialists)
        #[arg(long, conflicts_with = "remote")]
        multi: bool,
    },

    /// List the available tools
    Tools {
        /// List the remote tool server catalog instead of the built-in tools
        #[arg(long)]
        remote: bool,
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

    match cli.command {
        Commands::Chat {
            message,
            remote,
            multi,
        } => commands::chat::run(message, remote, multi, cli.config.as_deref()).await?,
        Commands::Tools { remote } => commands::tools::run(remote, cli.config.as_deref()).await?,
    }

    Ok(())
}
