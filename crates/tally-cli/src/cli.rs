//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Classify transaction descriptions
#[derive(Parser)]
#[command(name = "tally")]
#[command(
    about = "Classify free-text transaction descriptions and extract amounts",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Pipeline config file
    ///
    /// Defaults to $TALLY_CONFIG, then ~/.local/share/tally/config/pipeline.toml,
    /// then the built-in config.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one description
    Predict {
        /// Description text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify one description per line of a file
    Batch {
        /// Input file, or `-` for stdin
        #[arg(short, long)]
        file: PathBuf,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Load the config and every model, then print what is active
    Check,

    /// Show recent predictions from the SQLite audit log
    Audit {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from TALLY_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}
