//! Tally CLI - Transaction description classifier
//!
//! Usage:
//!   tally predict "Lunch at canteen – Rs. 500"   Classify one description
//!   tally batch --file expenses.txt             Classify a file, one per line
//!   tally check                                 Verify config and models
//!   tally serve --port 3000                     Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Predict { text, json } => commands::cmd_predict(config, &text.join(" "), json),
        Commands::Batch { file, json } => commands::cmd_batch(config, &file, json),
        Commands::Check => commands::cmd_check(config),
        Commands::Audit { limit } => commands::cmd_audit(config, limit),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(config, &host, port, no_auth).await,
    }
}
