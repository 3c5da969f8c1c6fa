//! Pluggable text classifiers
//!
//! A classifier owns one loaded model for its whole lifetime and maps an input
//! text to a `ScoreDistribution` over a fixed label set. Classifiers are
//! read-only after loading, so a single instance can serve concurrent calls.
//!
//! # Implementations
//!
//! - `LinearTextModel`: bag-of-words linear model loaded from a JSON artifact
//! - `MockClassifier`: fixed or failing responses for tests

mod linear;
mod mock;

pub use linear::{LinearTextModel, MODEL_FILE_NAME};
pub use mock::MockClassifier;

use crate::error::Result;
use crate::scores::ScoreDistribution;

/// Trait implemented by every text classifier
///
/// Implementations must be `Send + Sync` and must not mutate internal state
/// during `classify`.
pub trait TextClassifier: Send + Sync {
    /// Model name (for logs and audit)
    fn name(&self) -> &str;

    /// The fixed label set, in distribution order
    fn labels(&self) -> &[String];

    /// Score every label for one input text
    ///
    /// Must return a distribution whose labels are exactly `labels()`, for any
    /// input including the empty string.
    fn classify(&self, text: &str) -> Result<ScoreDistribution>;
}

/// Split text into lowercase alphanumeric tokens
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("Diesel 20L – LKR 8,000").collect();
        assert_eq!(tokens, vec!["diesel", "20l", "lkr", "8", "000"]);
    }

    #[test]
    fn test_tokenize_empty_and_symbols() {
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize("🍕🍕 -- !!").count(), 0);
    }
}
