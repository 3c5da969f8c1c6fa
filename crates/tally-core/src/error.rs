//! Error types for Tally

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A model artifact could not be loaded. Fatal: the pipeline is not usable.
    #[error("Failed to load model artifact '{}': {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    /// A classifier failed on one input.
    #[error("Classifier '{classifier}' failed: {reason}")]
    Classification { classifier: String, reason: String },

    /// The single per-call failure returned by `Predictor::predict`.
    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },

    /// The entity recognizer is unavailable or failed. Never escapes a prediction.
    #[error("Entity recognizer unavailable: {0}")]
    EntityRecognizer(String),

    #[error("Invalid score distribution: {0}")]
    InvalidDistribution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audit sink error: {0}")]
    Audit(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Build a `ModelLoad` error for an artifact path
    pub fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Classification` error for a named classifier
    pub fn classification(classifier: impl Into<String>, reason: impl ToString) -> Self {
        Error::Classification {
            classifier: classifier.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error happens while constructing the pipeline
    /// (as opposed to failing a single prediction call)
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ModelLoad { .. } | Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
