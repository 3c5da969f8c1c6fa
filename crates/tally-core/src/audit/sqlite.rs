//! SQLite-backed audit store with connection pooling

use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Serialize;
use tracing::info;

use super::{AuditSink, PredictionRecord};
use crate::error::Result;

pub type AuditPool = Pool<SqliteConnectionManager>;
pub type AuditConn = PooledConnection<SqliteConnectionManager>;

/// One stored prediction, as returned by `list_recent`
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub summary: String,
    pub amount: String,
    pub extraction_method: String,
    /// Full record, including every classifier's score distribution
    pub record: serde_json::Value,
}

/// Audit sink writing to the `prediction_audit` table
#[derive(Clone)]
pub struct AuditStore {
    pool: AuditPool,
    path: String,
}

impl AuditStore {
    /// Open (or create) the audit database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(4).build(manager)?;

        let store = Self {
            pool,
            path: path.display().to_string(),
        };
        store.run_migrations()?;

        info!(path = %store.path, "Opened audit store");
        Ok(store)
    }

    /// Create a throwaway store (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so that every pooled
    /// connection sees the same database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tally_audit_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_file(&path);

        Self::open(&path)
    }

    /// Path to the database file
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn conn(&self) -> Result<AuditConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS prediction_audit (
                id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                input TEXT NOT NULL,
                summary TEXT NOT NULL,
                amount TEXT NOT NULL,
                extraction_method TEXT NOT NULL,
                record_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_prediction_audit_timestamp
                ON prediction_audit(timestamp);
            "#,
        )?;

        Ok(())
    }

    /// Most recent predictions first
    pub fn list_recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, timestamp, input, summary, amount, extraction_method, record_json
            FROM prediction_audit
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, timestamp, input, summary, amount, extraction_method, record_json)| {
                    Ok(AuditEntry {
                        id,
                        timestamp: parse_timestamp(&timestamp),
                        input,
                        summary,
                        amount,
                        extraction_method,
                        record: serde_json::from_str(&record_json)?,
                    })
                },
            )
            .collect()
    }

    /// Number of stored predictions
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM prediction_audit", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

impl AuditSink for AuditStore {
    fn append(&self, record: &PredictionRecord) -> Result<()> {
        let record_json = serde_json::to_string(record)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO prediction_audit
                (timestamp, input, summary, amount, extraction_method, record_json)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.timestamp.to_rfc3339(),
                record.input,
                record.summary(),
                record.amount.as_str(),
                record.extraction_method.as_str(),
                record_json,
            ],
        )?;

        Ok(())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::LabelDecision;
    use crate::extract::{ExtractionMethod, MoneyAmount};
    use crate::scores::ScoreDistribution;

    fn record(input: &str, amount: Option<&str>) -> PredictionRecord {
        PredictionRecord {
            timestamp: Utc::now(),
            input: input.to_string(),
            decisions: vec![LabelDecision::from_distribution(
                "category",
                ScoreDistribution::new([("Food", 0.7), ("Transport", 0.3)]).unwrap(),
            )],
            amount: amount
                .map(|a| MoneyAmount::Found(a.to_string()))
                .unwrap_or(MoneyAmount::NotFound),
            extraction_method: if amount.is_some() {
                ExtractionMethod::Regex
            } else {
                ExtractionMethod::None
            },
        }
    }

    #[test]
    fn test_append_and_list_recent() {
        let store = AuditStore::in_memory().unwrap();
        store.append(&record("Lunch Rs. 500", Some("Rs. 500"))).unwrap();
        store.append(&record("Coffee", None)).unwrap();

        assert_eq!(store.count().unwrap(), 2);

        let entries = store.list_recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].input, "Coffee");
        assert_eq!(entries[0].amount, "Unknown");
        assert_eq!(entries[0].extraction_method, "none");
        assert_eq!(entries[1].amount, "Rs. 500");
        assert_eq!(entries[1].summary, "category: Food | Amount: Rs. 500 (regex)");
        assert_eq!(
            entries[1].record["decisions"][0]["scores"]["Transport"],
            0.3
        );
    }

    #[test]
    fn test_list_recent_respects_limit() {
        let store = AuditStore::in_memory().unwrap();
        for i in 0..5 {
            store.append(&record(&format!("item {i}"), None)).unwrap();
        }
        let entries = store.list_recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].input, "item 4");
    }

    #[test]
    fn test_reopen_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.db");

        let store = AuditStore::open(&path).unwrap();
        store.append(&record("Taxi", None)).unwrap();
        drop(store);

        let store = AuditStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
