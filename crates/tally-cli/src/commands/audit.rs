//! Audit log listing

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{AuditSinkKind, AuditStore};

use super::{load_config, truncate};

pub fn cmd_audit(config_path: Option<&Path>, limit: i64) -> Result<()> {
    let config = load_config(config_path)?;

    let path = match (config.audit.sink, config.audit.file_path()) {
        (AuditSinkKind::Sqlite, Some(path)) => path,
        (sink, _) => bail!(
            "The audit log is only queryable with the sqlite sink (configured: {})",
            sink.as_str()
        ),
    };

    let store = AuditStore::open(&path)
        .with_context(|| format!("Failed to open audit log {}", path.display()))?;
    let entries = store.list_recent(limit.max(1))?;

    if entries.is_empty() {
        println!("No predictions recorded yet.");
        return Ok(());
    }

    println!("📋 Recent predictions ({}):", path.display());
    println!();
    for entry in entries {
        println!(
            "{}  {:<40}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            truncate(&entry.input, 40),
            entry.summary
        );
    }

    Ok(())
}
