//! CLI entry point for the uTorrent WebUI client.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default.
    // Default is warn so command output stays clean on stdout.
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let loaded = app_config::load_default_file_config()?;
    if let Some(path) = &loaded.path
        && loaded.config.is_some()
    {
        info!(path = %path.display(), "Loaded config file");
    }

    let params = commands::connection_params(&args.connection, loaded.config.as_ref())?;
    debug!(?params, "Connection parameters resolved");

    commands::run(args.command, &params, args.json).await
}
