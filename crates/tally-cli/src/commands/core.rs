//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve and parse the pipeline config
//! - `open_pipeline` - Load every model and open the audit sink

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{PipelineConfig, Predictor};

/// Resolve the active pipeline config
pub fn load_config(config_path: Option<&Path>) -> Result<PipelineConfig> {
    PipelineConfig::load(config_path).context("Failed to load pipeline config")
}

/// Build the predictor described by the active config
pub fn open_pipeline(config_path: Option<&Path>) -> Result<Predictor> {
    let config = load_config(config_path)?;
    build_pipeline(&config)
}

pub fn build_pipeline(config: &PipelineConfig) -> Result<Predictor> {
    Predictor::from_config(config).context("Failed to load prediction pipeline")
}

/// Truncate a string to `max` characters, appending "..." when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
