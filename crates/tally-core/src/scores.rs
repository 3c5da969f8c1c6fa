//! Score distributions produced by classifiers
//!
//! A `ScoreDistribution` is an ordered label → score association. Order is the
//! classifier's label order and is what the arg-max tie-break relies on:
//! when several labels share the maximum score, the first one wins.
//!
//! Scores are not assumed to be normalized. The only assumption is that a
//! higher score means more confidence.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};

/// One label with its score
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Non-empty, ordered label → score mapping with unique labels
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDistribution {
    scores: Vec<LabelScore>,
}

impl ScoreDistribution {
    /// Build a distribution, preserving the given order
    ///
    /// Fails if the iterator is empty, a label appears twice or a score is
    /// not finite.
    pub fn new<I, L>(scores: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: Into<String>,
    {
        let mut out: Vec<LabelScore> = Vec::new();
        for (label, score) in scores {
            let label = label.into();
            if out.iter().any(|s| s.label == label) {
                return Err(Error::InvalidDistribution(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
            if !score.is_finite() {
                return Err(Error::InvalidDistribution(format!(
                    "non-finite score {} for label '{}'",
                    score, label
                )));
            }
            out.push(LabelScore { label, score });
        }

        if out.is_empty() {
            return Err(Error::InvalidDistribution(
                "distribution has no labels".to_string(),
            ));
        }

        Ok(Self { scores: out })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelScore> {
        self.scores.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|s| s.label.as_str())
    }

    /// Score for a label, if present
    pub fn get(&self, label: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
    }

    /// Winning label: maximum score, first label on ties
    pub fn top(&self) -> &LabelScore {
        let idx = arg_max(self.scores.iter().map(|s| s.score)).unwrap_or(0);
        &self.scores[idx]
    }
}

/// Index of the maximum value, or `None` for an empty input
///
/// Ties go to the earliest index. NaN never beats a number; if every value is
/// NaN the first index is returned.
pub fn arg_max<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.into_iter().enumerate() {
        best = match best {
            None => Some((idx, value)),
            Some((_, current)) if current.is_nan() && !value.is_nan() => Some((idx, value)),
            Some((_, current)) if value > current => Some((idx, value)),
            keep => keep,
        };
    }
    best.map(|(idx, _)| idx)
}

impl Serialize for ScoreDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for s in &self.scores {
            map.serialize_entry(&s.label, &s.score)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        let result = ScoreDistribution::new(Vec::<(String, f64)>::new());
        assert!(matches!(result, Err(Error::InvalidDistribution(_))));
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let result = ScoreDistribution::new([("Food", 0.5), ("Food", 0.2)]);
        assert!(matches!(result, Err(Error::InvalidDistribution(_))));
    }

    #[test]
    fn test_rejects_non_finite_scores() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = ScoreDistribution::new([("Food", 0.5), ("Bills", bad)]);
            assert!(matches!(result, Err(Error::InvalidDistribution(_))));
        }
    }

    #[test]
    fn test_top_picks_maximum() {
        let dist = ScoreDistribution::new([("Food", 0.2), ("Transport", 0.7), ("Bills", 0.1)])
            .unwrap();
        assert_eq!(dist.top().label, "Transport");
        assert_eq!(dist.top().score, 0.7);
    }

    #[test]
    fn test_tie_goes_to_first_label() {
        let dist = ScoreDistribution::new([("Expense", 0.5), ("Income", 0.5)]).unwrap();
        assert_eq!(dist.top().label, "Expense");

        let dist = ScoreDistribution::new([("Income", 0.5), ("Expense", 0.5)]).unwrap();
        assert_eq!(dist.top().label, "Income");
    }

    #[test]
    fn test_unnormalized_and_negative_scores() {
        let dist = ScoreDistribution::new([("A", -3.0), ("B", -1.5), ("C", -2.0)]).unwrap();
        assert_eq!(dist.top().label, "B");

        let dist = ScoreDistribution::new([("A", 12.0), ("B", 40.0)]).unwrap();
        assert_eq!(dist.top().label, "B");
    }

    #[test]
    fn test_nan_never_wins() {
        assert_eq!(arg_max([f64::NAN, 0.1, 0.3]), Some(2));
        assert_eq!(arg_max([0.4, f64::NAN, 0.3]), Some(0));
        assert_eq!(arg_max([f64::NAN, f64::NAN]), Some(0));
        assert_eq!(arg_max(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_serializes_in_label_order() {
        let dist = ScoreDistribution::new([("Income", 0.25), ("Expense", 0.75)]).unwrap();
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(json, r#"{"Income":0.25,"Expense":0.75}"#);
    }

    #[test]
    fn test_get_and_labels() {
        let dist = ScoreDistribution::new([("Food", 0.6), ("Bills", 0.4)]).unwrap();
        assert_eq!(dist.get("Bills"), Some(0.4));
        assert_eq!(dist.get("Travel"), None);
        assert_eq!(dist.labels().collect::<Vec<_>>(), vec!["Food", "Bills"]);
        assert_eq!(dist.len(), 2);
    }
}
