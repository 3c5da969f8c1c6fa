//! Mock classifier for testing
//!
//! Returns a fixed distribution for every input, or fails on every call.
//! Counts invocations so tests can assert that a classifier was (or was not)
//! called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::TextClassifier;
use crate::error::{Error, Result};
use crate::scores::ScoreDistribution;

/// Mock classifier with scripted output
#[derive(Debug, Clone)]
pub struct MockClassifier {
    name: String,
    labels: Vec<String>,
    scores: Vec<f64>,
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    /// Classifier that always returns the given distribution
    pub fn new<L: Into<String>>(name: &str, scores: impl IntoIterator<Item = (L, f64)>) -> Self {
        let (labels, scores) = scores
            .into_iter()
            .map(|(label, score)| (label.into(), score))
            .unzip();
        Self {
            name: name.to_string(),
            labels,
            scores,
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Classifier whose every call fails with the given reason
    pub fn failing(name: &str, labels: &[&str], reason: &str) -> Self {
        let mut mock = Self::new(name, labels.iter().map(|l| (*l, 0.0)));
        mock.failure = Some(reason.to_string());
        mock
    }

    /// Two-label Expense/Income classifier
    pub fn transaction_type(expense: f64, income: f64) -> Self {
        Self::new("mock-type", [("Expense", expense), ("Income", income)])
    }

    /// Number of `classify` calls so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextClassifier for MockClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, _text: &str) -> Result<ScoreDistribution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref reason) = self.failure {
            return Err(Error::classification(&self.name, reason));
        }
        ScoreDistribution::new(self.labels.iter().cloned().zip(self.scores.iter().copied()))
    }
}
