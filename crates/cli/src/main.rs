//! Courier CLI
//!
//! Sends email through Mailgun, or previews the Mailgun request a message
//! would produce.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::CourierConfig;

/// Courier CLI: send email through Mailgun.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        long,
        env = "COURIER_CONFIG",
        default_value = "courier.toml",
        global = true
    )]
    config: PathBuf,

    /// Mailgun API key; overrides `api_key` in the config file.
    #[arg(long, env = "MAILGUN_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message and print the per-recipient statuses.
    Send(commands::send::SendArgs),
    /// Show the Mailgun request a message would produce, without sending it.
    Preview(commands::preview::PreviewArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CourierConfig::load(&cli.config, cli.api_key.as_deref())?;

    match cli.command {
        Command::Send(args) => commands::send::run(&config, &args, &cli.format).await,
        Command::Preview(args) => commands::preview::run(&config, &args, &cli.format),
    }
}
