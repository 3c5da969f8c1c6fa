//! Bag-of-words linear text classifier
//!
//! Artifact format (`model.json`):
//!
//! ```json
//! {
//!   "name": "transaction_type",
//!   "labels": ["Expense", "Income"],
//!   "bias": { "Expense": 0.5, "Income": -0.5 },
//!   "weights": { "salary": { "Income": 3.0 }, "paid": { "Expense": 1.5 } }
//! }
//! ```
//!
//! Each label's logit is its bias plus the weight of every token in the input
//! (repeated tokens count repeatedly). The distribution is the softmax of the
//! logits, in `labels` order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::{tokenize, TextClassifier};
use crate::error::{Error, Result};
use crate::scores::ScoreDistribution;

/// File looked up when the artifact path is a directory
pub const MODEL_FILE_NAME: &str = "model.json";

#[derive(Debug, Deserialize)]
struct RawModel {
    name: Option<String>,
    labels: Vec<String>,
    #[serde(default)]
    bias: HashMap<String, f64>,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, f64>>,
}

/// Linear model loaded from a JSON artifact
#[derive(Debug, Clone)]
pub struct LinearTextModel {
    name: String,
    labels: Vec<String>,
    bias: Vec<f64>,
    /// token -> (label index, weight)
    weights: HashMap<String, Vec<(usize, f64)>>,
}

impl LinearTextModel {
    /// Load from an artifact directory (containing `model.json`) or file
    pub fn load(path: &Path) -> Result<Self> {
        let file = resolve_artifact_file(path);
        let content = fs::read_to_string(&file).map_err(|e| Error::model_load(&file, e))?;
        let model = Self::parse(&content, &file)?;

        info!(
            model = %model.name,
            path = %file.display(),
            labels = model.labels.len(),
            vocabulary = model.weights.len(),
            "Loaded text classifier"
        );
        Ok(model)
    }

    /// Build from JSON text (for embedded or in-memory artifacts)
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(json: &str, origin: &Path) -> Result<Self> {
        let raw: RawModel =
            serde_json::from_str(json).map_err(|e| Error::model_load(origin, e))?;

        if raw.labels.is_empty() {
            return Err(Error::model_load(origin, "model declares no labels"));
        }

        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, label) in raw.labels.iter().enumerate() {
            if index.insert(label.as_str(), i).is_some() {
                return Err(Error::model_load(
                    origin,
                    format!("duplicate label '{}'", label),
                ));
            }
        }

        let lookup = |label: &str| {
            index.get(label).copied().ok_or_else(|| {
                Error::model_load(origin, format!("undeclared label '{}'", label))
            })
        };

        let mut bias = vec![0.0; raw.labels.len()];
        for (label, value) in &raw.bias {
            bias[lookup(label)?] = *value;
        }

        // Keys differing only by case share one token; weights are summed in
        // sorted key order.
        let mut tokens: Vec<&String> = raw.weights.keys().collect();
        tokens.sort();

        let mut weights: HashMap<String, Vec<(usize, f64)>> =
            HashMap::with_capacity(tokens.len());
        for token in tokens {
            let entries = weights.entry(token.to_lowercase()).or_default();
            for (label, weight) in &raw.weights[token] {
                let idx = lookup(label)?;
                match entries.iter_mut().find(|(i, _)| *i == idx) {
                    Some((_, total)) => *total += *weight,
                    None => entries.push((idx, *weight)),
                }
            }
        }

        let name = raw.name.unwrap_or_else(|| {
            origin
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "linear".to_string())
        });

        Ok(Self {
            name,
            labels: raw.labels,
            bias,
            weights,
        })
    }

    fn logits(&self, text: &str) -> Vec<f64> {
        let mut logits = self.bias.clone();
        for token in tokenize(text) {
            if let Some(entries) = self.weights.get(&token) {
                for (idx, weight) in entries {
                    logits[*idx] += weight;
                }
            }
        }
        logits
    }
}

impl TextClassifier for LinearTextModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, text: &str) -> Result<ScoreDistribution> {
        let logits = self.logits(text);
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(Error::classification(
                &self.name,
                "non-finite logit (corrupt weights?)",
            ));
        }

        ScoreDistribution::new(self.labels.iter().cloned().zip(softmax(&logits)))
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn resolve_artifact_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(MODEL_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
