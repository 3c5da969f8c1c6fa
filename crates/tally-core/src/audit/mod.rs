//! Append-only audit log of prediction decisions
//!
//! Every successful prediction produces one `PredictionRecord` that is handed
//! to the `AuditSink` injected into the `Predictor`. Sinks accept concurrent
//! appends; each record is written as one unit.
//!
//! # Sinks
//!
//! - `TracingAuditSink`: structured `tracing` event per record (target `tally::audit`)
//! - `JsonlAuditSink`: one JSON object per line in an append-only file
//! - `AuditStore`: SQLite table, queryable with `list_recent`
//! - `MemoryAuditSink`: in-memory, for tests

mod jsonl;
mod record;
mod sqlite;

pub use jsonl::JsonlAuditSink;
pub use record::{LabelDecision, PredictionRecord};
pub use sqlite::{AuditEntry, AuditStore};

use std::sync::Mutex;

use tracing::info;

use crate::error::{Error, Result};

/// Trait implemented by every audit sink
pub trait AuditSink: Send + Sync {
    /// Append one record
    fn append(&self, record: &PredictionRecord) -> Result<()>;

    /// Flush buffered records (called at shutdown)
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sink that emits each record as a structured log event
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn append(&self, record: &PredictionRecord) -> Result<()> {
        let decisions = serde_json::to_string(&record.decisions)?;
        info!(
            target: "tally::audit",
            input = %record.input,
            amount = %record.amount,
            extraction_method = %record.extraction_method,
            decisions = %decisions,
            "{}",
            record.summary()
        );
        Ok(())
    }
}

/// Sink keeping records in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<PredictionRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records appended so far
    pub fn records(&self) -> Vec<PredictionRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, record: &PredictionRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| Error::Audit("memory sink lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}
