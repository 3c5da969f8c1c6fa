//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tally_server::{ServerConfig, API_KEYS_ENV};

use super::open_pipeline;

pub async fn cmd_serve(
    config_path: Option<&Path>,
    host: &str,
    port: u16,
    no_auth: bool,
) -> Result<()> {
    println!("🚀 Starting Tally web server...");
    println!("   Listening: http://{}:{}", host, port);

    let predictor = Arc::new(open_pipeline(config_path)?);
    println!("   Classifiers: {}", predictor.roles().join(", "));

    let mut config = ServerConfig::from_env();
    config.require_auth = !no_auth;

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if config.api_keys.is_empty() {
        println!("   🔒 Authentication: API key required, but none configured");
        println!("      Set {} (comma-separated) or use --no-auth", API_KEYS_ENV);
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            config.api_keys.len(),
            API_KEYS_ENV
        );
    }
    println!();

    tally_server::serve_with_config(predictor, host, port, config).await
}
