//! Tally Core Library
//!
//! Classifies free-text financial transaction descriptions:
//! - Text classifiers (transaction type, spending category) loaded from JSON artifacts
//! - Amount extraction: currency regex first, entity recognizer fallback
//! - Score distributions with deterministic arg-max
//! - Prediction pipeline combining classifiers, extractor and audit sink
//! - Audit sinks (tracing, JSON Lines, SQLite)
//! - TOML pipeline configuration

pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod scores;

/// Test utilities: scripted recognizers and artifact fixtures
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use audit::{
    AuditEntry, AuditSink, AuditStore, JsonlAuditSink, LabelDecision, MemoryAuditSink,
    PredictionRecord, TracingAuditSink,
};
pub use classify::{LinearTextModel, MockClassifier, TextClassifier};
pub use config::{AuditSinkKind, PipelineConfig};
pub use error::{Error, Result};
pub use extract::{
    AmountExtractor, EntityRecognizer, EntityStrategy, Extraction, ExtractionMethod,
    ExtractionStrategy, LexiconRecognizer, MoneyAmount, PatternStrategy,
};
pub use pipeline::{PredictionResult, Predictor, PredictorBuilder};
pub use scores::{LabelScore, ScoreDistribution};
