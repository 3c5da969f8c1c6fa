//! Monetary amount extraction
//!
//! Amounts are located by an ordered chain of strategies. Each strategy
//! returns an optional verbatim substring and the first success wins:
//!
//! 1. `PatternStrategy` - deterministic currency regex (`Rs.1,000`, `₹500`, `$ 12.50`)
//! 2. `EntityStrategy` - first `MONEY` span from an entity recognizer
//!
//! When nothing matches the amount is `MoneyAmount::NotFound`, rendered as
//! `Unknown`. Extraction never fails.

mod entity;
mod lexicon;
mod pattern;

pub use entity::{Entity, EntityRecognizer, EntityStrategy, RecognizerLoader, MONEY_LABEL};
pub use lexicon::{LexiconRecognizer, LEXICON_FILE_NAME};
pub use pattern::PatternStrategy;

use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

/// A monetary amount as written in the text, or the "not found" sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyAmount {
    Found(String),
    NotFound,
}

impl MoneyAmount {
    /// How `NotFound` is rendered to callers
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn as_str(&self) -> &str {
        match self {
            MoneyAmount::Found(s) => s,
            MoneyAmount::NotFound => Self::UNKNOWN,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MoneyAmount::Found(_))
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MoneyAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which strategy produced an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Regex,
    Ner,
    None,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Ner => "ner",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running the extraction chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub amount: MoneyAmount,
    pub method: ExtractionMethod,
}

impl Extraction {
    pub fn not_found() -> Self {
        Self {
            amount: MoneyAmount::NotFound,
            method: ExtractionMethod::None,
        }
    }
}

/// One step of the extraction chain
pub trait ExtractionStrategy: Send + Sync {
    /// Method tag recorded when this strategy wins
    fn method(&self) -> ExtractionMethod;

    /// Verbatim amount substring, if this strategy finds one
    fn find(&self, text: &str) -> Option<String>;
}

/// Ordered chain of extraction strategies
#[derive(Default)]
pub struct AmountExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl AmountExtractor {
    /// Empty chain (always returns the sentinel)
    pub fn new() -> Self {
        Self::default()
    }

    /// Pattern matching only
    pub fn pattern_only() -> Self {
        Self::new().with_strategy(PatternStrategy::new())
    }

    /// Pattern matching, then the entity recognizer fallback
    pub fn standard(entity: EntityStrategy) -> Self {
        Self::new()
            .with_strategy(PatternStrategy::new())
            .with_strategy(entity)
    }

    /// Append a strategy to the end of the chain
    pub fn with_strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Method tags of the chain, in order
    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Run the chain; first match wins
    pub fn extract(&self, text: &str) -> Extraction {
        for strategy in &self.strategies {
            if let Some(amount) = strategy.find(text) {
                let method = strategy.method();
                info!(method = %method, amount = %amount, input = %text, "Extracted amount");
                return Extraction {
                    amount: MoneyAmount::Found(amount),
                    method,
                };
            }
        }

        warn!(input = %text, "No amount found");
        Extraction::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::test_utils::ScriptedRecognizer;

    #[test]
    fn test_money_amount_rendering() {
        assert_eq!(MoneyAmount::NotFound.to_string(), "Unknown");
        assert_eq!(MoneyAmount::Found("₹500".into()).to_string(), "₹500");
        assert_eq!(
            serde_json::to_string(&MoneyAmount::NotFound).unwrap(),
            r#""Unknown""#
        );
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::Ner).unwrap(),
            r#""ner""#
        );
    }

    #[test]
    fn test_pattern_match_skips_entity_recognizer() {
        let recognizer = Arc::new(ScriptedRecognizer::money("LKR 500"));
        let extractor =
            AmountExtractor::standard(EntityStrategy::with_recognizer(recognizer.clone()));

        let result = extractor.extract("Lunch at canteen – Rs. 500");
        assert_eq!(result.amount, MoneyAmount::Found("Rs. 500".into()));
        assert_eq!(result.method, ExtractionMethod::Regex);
        assert_eq!(recognizer.calls(), 0);
    }

    #[test]
    fn test_entity_fallback_when_no_pattern() {
        let recognizer = Arc::new(ScriptedRecognizer::money("eight thousand rupees"));
        let extractor =
            AmountExtractor::standard(EntityStrategy::with_recognizer(recognizer.clone()));

        let result = extractor.extract("Paid eight thousand rupees for rent");
        assert_eq!(
            result.amount,
            MoneyAmount::Found("eight thousand rupees".into())
        );
        assert_eq!(result.method, ExtractionMethod::Ner);
        assert_eq!(recognizer.calls(), 1);
    }

    #[test]
    fn test_sentinel_when_nothing_matches() {
        let extractor = AmountExtractor::standard(EntityStrategy::with_recognizer(Arc::new(
            ScriptedRecognizer::empty(),
        )));
        assert_eq!(extractor.extract("Coffee with friends"), Extraction::not_found());
        assert_eq!(extractor.extract(""), Extraction::not_found());
    }

    #[test]
    fn test_empty_chain_returns_sentinel() {
        let extractor = AmountExtractor::new();
        assert_eq!(extractor.extract("Rs. 500"), Extraction::not_found());
    }

    #[test]
    fn test_chain_order() {
        let extractor = AmountExtractor::standard(EntityStrategy::with_recognizer(Arc::new(
            ScriptedRecognizer::empty(),
        )));
        assert_eq!(
            extractor.methods(),
            vec![ExtractionMethod::Regex, ExtractionMethod::Ner]
        );
    }
}
