//! Prediction audit records

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extract::{ExtractionMethod, MoneyAmount};
use crate::scores::ScoreDistribution;

/// The winning label of one classifier, with its full evidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDecision {
    /// Classifier role (e.g. "type", "category")
    pub classifier: String,
    pub label: String,
    pub score: f64,
    pub scores: ScoreDistribution,
}

impl LabelDecision {
    /// Resolve a distribution to its arg-max label
    pub fn from_distribution(classifier: impl Into<String>, scores: ScoreDistribution) -> Self {
        let top = scores.top().clone();
        Self {
            classifier: classifier.into(),
            label: top.label,
            score: top.score,
            scores,
        }
    }
}

/// Everything decided during one prediction call
///
/// Built once, never mutated after it is handed to an `AuditSink`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub decisions: Vec<LabelDecision>,
    pub amount: MoneyAmount,
    pub extraction_method: ExtractionMethod,
}

impl PredictionRecord {
    /// Chosen label for a classifier role
    pub fn label_for(&self, classifier: &str) -> Option<&str> {
        self.decision_for(classifier).map(|d| d.label.as_str())
    }

    pub fn decision_for(&self, classifier: &str) -> Option<&LabelDecision> {
        self.decisions.iter().find(|d| d.classifier == classifier)
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let labels = self
            .decisions
            .iter()
            .map(|d| format!("{}: {}", d.classifier, d.label))
            .collect::<Vec<_>>()
            .join(" | ");
        if labels.is_empty() {
            format!("Amount: {} ({})", self.amount, self.extraction_method)
        } else {
            format!(
                "{} | Amount: {} ({})",
                labels, self.amount, self.extraction_method
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PredictionRecord {
        PredictionRecord {
            timestamp: Utc::now(),
            input: "Lunch – Rs. 500".to_string(),
            decisions: vec![
                LabelDecision::from_distribution(
                    "type",
                    ScoreDistribution::new([("Expense", 0.8), ("Income", 0.2)]).unwrap(),
                ),
                LabelDecision::from_distribution(
                    "category",
                    ScoreDistribution::new([("Food", 0.6), ("Bills", 0.4)]).unwrap(),
                ),
            ],
            amount: MoneyAmount::Found("Rs. 500".to_string()),
            extraction_method: ExtractionMethod::Regex,
        }
    }

    #[test]
    fn test_label_lookup() {
        let record = record();
        assert_eq!(record.label_for("type"), Some("Expense"));
        assert_eq!(record.label_for("category"), Some("Food"));
        assert_eq!(record.label_for("sentiment"), None);
        assert_eq!(record.decision_for("category").unwrap().score, 0.6);
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            record().summary(),
            "type: Expense | category: Food | Amount: Rs. 500 (regex)"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["input"], "Lunch – Rs. 500");
        assert_eq!(json["amount"], "Rs. 500");
        assert_eq!(json["extraction_method"], "regex");
        assert_eq!(json["decisions"][0]["classifier"], "type");
        assert_eq!(json["decisions"][0]["scores"]["Income"], 0.2);
        assert!(json["timestamp"].is_string());
    }
}
