//! Config and model verification

use std::path::Path;

use anyhow::Result;
use tally_core::TextClassifier;

use super::{build_pipeline, load_config};

pub fn cmd_check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    match &config.source {
        Some(path) => println!("🔧 Config: {}", path.display()),
        None => println!("🔧 Config: built-in default"),
    }

    let predictor = build_pipeline(&config)?;

    println!();
    println!("Classifiers:");
    if predictor.classifiers().is_empty() {
        println!("   (none configured)");
    }
    for active in predictor.classifiers() {
        println!(
            "   {:<10} {} [{}]",
            active.role,
            active.classifier.name(),
            active.classifier.labels().join(", ")
        );
    }

    println!();
    println!(
        "Amount extraction: {}",
        predictor
            .extraction_methods()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    );
    if let Some(model) = &config.extraction.entity_model {
        println!("   Entity model: {} (loaded on first use)", model.display());
    }

    print!("Audit sink: {}", config.audit.sink.as_str());
    match config.audit.file_path() {
        Some(path) => println!(" ({})", path.display()),
        None => println!(),
    }

    println!();
    println!("✅ Pipeline loaded successfully");
    Ok(())
}
