//! Test utilities for tally-core
//!
//! Scripted collaborators for pipeline tests plus helpers for writing model
//! artifacts into temporary directories. Enabled for this crate's tests and,
//! through the `test-utils` feature, for the other workspace crates.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::audit::{AuditSink, PredictionRecord};
use crate::config::{AuditSinkKind, PipelineConfig};
use crate::error::{Error, Result};
use crate::extract::{Entity, EntityRecognizer, MONEY_LABEL};

/// Entity recognizer returning a fixed list of entities for every input
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    entities: Vec<(String, String)>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    /// Recognizer returning `(text, label)` pairs in order
    pub fn new(entities: Vec<(&str, &str)>) -> Self {
        Self {
            entities: entities
                .into_iter()
                .map(|(text, label)| (text.to_string(), label.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    /// Recognizer returning a single MONEY entity
    pub fn money(text: &str) -> Self {
        Self::new(vec![(text, MONEY_LABEL)])
    }

    /// Recognizer that never finds anything
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recognizer whose every call errors
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Number of `recognize` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityRecognizer for ScriptedRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<Entity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::EntityRecognizer("scripted failure".to_string()));
        }

        let mut offset = 0;
        Ok(self
            .entities
            .iter()
            .map(|(text, label)| {
                let entity = Entity {
                    text: text.clone(),
                    label: label.clone(),
                    start: offset,
                    end: offset + text.len(),
                };
                offset = entity.end + 1;
                entity
            })
            .collect())
    }
}

/// Audit sink whose every append fails
#[derive(Debug, Default, Clone)]
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn append(&self, _record: &PredictionRecord) -> Result<()> {
        Err(Error::Audit("disk full".to_string()))
    }
}

/// Write `content` to `dir/name/file`, returning the artifact directory
pub fn write_artifact(dir: &Path, name: &str, file: &str, content: &str) -> PathBuf {
    let artifact = dir.join(name);
    fs::create_dir_all(&artifact).expect("create artifact dir");
    fs::write(artifact.join(file), content).expect("write artifact");
    artifact
}

/// Small two-label Expense/Income model
pub const TYPE_MODEL_JSON: &str = r#"{
    "name": "fixture-type",
    "labels": ["Expense", "Income"],
    "bias": { "Expense": 0.2, "Income": 0.0 },
    "weights": {
        "salary": { "Income": 3.0 },
        "refund": { "Income": 2.0 },
        "paid": { "Expense": 1.0 }
    }
}"#;

/// Small category model
pub const CATEGORY_MODEL_JSON: &str = r#"{
    "name": "fixture-category",
    "labels": ["Food", "Transport", "Other"],
    "bias": { "Other": 0.1 },
    "weights": {
        "lunch": { "Food": 2.0 },
        "diesel": { "Transport": 2.5 },
        "taxi": { "Transport": 2.0 }
    }
}"#;

/// Small money lexicon
pub const LEXICON_JSON: &str = r#"{
    "name": "fixture-money",
    "currency_codes": ["LKR", "EUR"],
    "currency_symbols": ["€"],
    "currency_words": ["rupees"],
    "quantity_units": ["l", "kg"]
}"#;

/// Temporary directory holding fixture artifacts and a `pipeline.toml`
pub struct PipelineFixture {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl PipelineFixture {
    /// Write the fixture models, lexicon and config, then load the config
    pub fn new(sink: AuditSinkKind) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let models = dir.path().join("models");
        write_artifact(&models, "type", "model.json", TYPE_MODEL_JSON);
        write_artifact(&models, "category", "model.json", CATEGORY_MODEL_JSON);
        write_artifact(&models, "money", "lexicon.json", LEXICON_JSON);

        let config_path = dir.path().join("pipeline.toml");
        fs::write(
            &config_path,
            format!(
                r#"
[[classifiers]]
role = "type"
path = "models/type"

[[classifiers]]
role = "category"
path = "models/category"

[extraction]
strategies = ["pattern", "entity"]
entity_model = "models/money"

[audit]
sink = "{}"
"#,
                sink.as_str()
            ),
        )
        .expect("write pipeline config");

        let config = PipelineConfig::from_file(&config_path).expect("load fixture config");
        Self { dir, config }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("pipeline.toml")
    }
}
