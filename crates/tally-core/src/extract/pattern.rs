//! Deterministic currency amount matching

use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractionMethod, ExtractionStrategy};
use crate::error::Result;

/// Currency prefix (Rs, Rs., INR, ₹, $, USD), optional single whitespace,
/// digits with grouping commas and an optional fraction.
///
/// The leading group stands in for a word boundary: `₹` and `$` are not word
/// characters, so `\b` in front of them would reject "paid $5". The amount is
/// matched greedily and any word characters glued to it land in `tail`; a
/// non-empty tail means the amount is part of a longer token ("Rs 1,500x").
const DEFAULT_PATTERN: &str = r"(?i)(?:^|[^\p{L}\p{N}_])(?P<amount>(?:rs\.?|inr|usd|₹|\$)\s?[0-9][0-9,]*(?:\.[0-9]+)?)(?P<tail>[\p{L}\p{N}_]*)";

static DEFAULT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PATTERN).expect("default amount pattern is valid"));

/// Regex-based amount strategy
#[derive(Debug, Clone)]
pub struct PatternStrategy {
    regex: Regex,
}

impl PatternStrategy {
    /// Strategy using the built-in currency pattern
    pub fn new() -> Self {
        Self {
            regex: DEFAULT_REGEX.clone(),
        }
    }

    /// Strategy using a custom pattern
    ///
    /// The returned text is the `amount` group if present, else capture group
    /// 1, else the whole match. Matches with a non-empty `tail` group are
    /// skipped.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

impl Default for PatternStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for PatternStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Regex
    }

    fn find(&self, text: &str) -> Option<String> {
        self.regex
            .captures_iter(text)
            .filter(|caps| caps.name("tail").map_or(true, |t| t.is_empty()))
            .find_map(|caps| {
                let amount = caps
                    .name("amount")
                    .or_else(|| caps.get(1))
                    .or_else(|| caps.get(0))?;
                // Grouping commas never end an amount ("Rs. 500, paid")
                let amount = amount.as_str().trim_end_matches(',');
                (!amount.is_empty()).then(|| amount.to_string())
            })
    }
}
