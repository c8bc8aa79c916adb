//! MXD CLI - chat-markdown and Matrix message transcoder.
//!
//! Provides commands for:
//! - `to-matrix`: Convert a chat message to Matrix event content
//! - `to-discord`: Convert a Matrix message to chat markdown
//! - `edit`: Format an edit notice from two versions of a chat message

mod commands;
mod error;
mod fixture;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommonArgs, EditArgs, ToDiscordArgs, ToMatrixArgs};
use output::Output;

/// MXD - chat-markdown and Matrix message transcoder.
#[derive(Parser)]
#[command(name = "mxd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a chat message (JSON) to Matrix event content.
    ToMatrix(ToMatrixArgs),
    /// Convert a Matrix message (JSON) to chat markdown.
    ToDiscord(ToDiscordArgs),
    /// Format an edit notice from the previous and the new chat message.
    Edit(EditArgs),
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Self::ToMatrix(args) => &args.common,
            Self::ToDiscord(args) => &args.common,
            Self::Edit(args) => &args.common,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.common().verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async {
        match cli.command {
            Commands::ToMatrix(args) => args.execute().await,
            Commands::ToDiscord(args) => args.execute().await,
            Commands::Edit(args) => args.execute().await,
        }
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
