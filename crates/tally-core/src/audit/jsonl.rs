//! Append-only JSON Lines audit file

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use super::{AuditSink, PredictionRecord};
use crate::error::{Error, Result};

/// Audit sink writing one JSON object per line
pub struct JsonlAuditSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlAuditSink {
    /// Open `path` for appending, creating it (and its directory) if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        info!(path = %path.display(), "Opened JSONL audit log");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, record: &PredictionRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| Error::Audit("audit log lock poisoned".to_string()))?;
        // Whole line under one lock, flushed so a crash loses at most the current record
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .map_err(|_| Error::Audit("audit log lock poisoned".to_string()))?
            .flush()?;
        Ok(())
    }
}
