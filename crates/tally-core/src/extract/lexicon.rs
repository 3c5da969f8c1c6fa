//! Lexicon-driven entity recognizer
//!
//! Recognizes three entity classes from a JSON lexicon (`lexicon.json`):
//!
//! - `MONEY`: `LKR 8,000`, `€20`, `5k LKR`, `1000 rupees`
//! - `QUANTITY`: `20L`, `5 kg`
//! - `CARDINAL`: bare numbers
//!
//! Overlapping matches are resolved leftmost-longest, with MONEY preferred over
//! QUANTITY over CARDINAL when two spans are identical.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use super::entity::{Entity, EntityRecognizer, MONEY_LABEL};
use crate::error::{Error, Result};

/// File looked up when the artifact path is a directory
pub const LEXICON_FILE_NAME: &str = "lexicon.json";

const QUANTITY_LABEL: &str = "QUANTITY";
const CARDINAL_LABEL: &str = "CARDINAL";

/// Digits with grouping commas and an optional fraction
const NUMBER: &str = r"[0-9][0-9,]*(?:\.[0-9]+)?";

#[derive(Debug, Deserialize)]
struct RawLexicon {
    name: Option<String>,
    #[serde(default)]
    currency_codes: Vec<String>,
    #[serde(default)]
    currency_symbols: Vec<String>,
    #[serde(default)]
    currency_words: Vec<String>,
    #[serde(default)]
    scale_words: Vec<String>,
    #[serde(default)]
    quantity_units: Vec<String>,
}

#[derive(Debug, Clone)]
struct EntityPattern {
    regex: Regex,
    label: &'static str,
    /// Lower wins when two candidates cover the same span
    rank: u8,
}

/// Recognizer compiled from a currency/unit lexicon
#[derive(Debug, Clone)]
pub struct LexiconRecognizer {
    name: String,
    patterns: Vec<EntityPattern>,
}

impl LexiconRecognizer {
    /// Load from an artifact directory (containing `lexicon.json`) or file
    pub fn load(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            path.join(LEXICON_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let content = fs::read_to_string(&file).map_err(|e| Error::model_load(&file, e))?;
        let recognizer = Self::parse(&content, &file)?;

        info!(
            recognizer = %recognizer.name,
            path = %file.display(),
            "Loaded lexicon entity recognizer"
        );
        Ok(recognizer)
    }

    /// Build from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn parse(json: &str, origin: &Path) -> Result<Self> {
        let raw: RawLexicon =
            serde_json::from_str(json).map_err(|e| Error::model_load(origin, e))?;

        let codes = alternation(&raw.currency_codes);
        let symbols = alternation(&raw.currency_symbols);
        let words = alternation(&raw.currency_words);
        let scales = alternation(&raw.scale_words);
        let units = alternation(&raw.quantity_units);

        if codes.is_none() && symbols.is_none() && words.is_none() {
            return Err(Error::model_load(origin, "lexicon has no currency terms"));
        }

        let scale = scales
            .as_deref()
            .map(|s| format!(r"(?:\s?(?:{s}))?"))
            .unwrap_or_default();

        let mut sources: Vec<(String, &'static str, u8)> = Vec::new();

        // <code|symbol> <number> [scale]
        let prefix = match (&codes, &symbols) {
            (Some(c), Some(s)) => Some(format!(r"(?:\b(?:{c})|(?:{s}))")),
            (Some(c), None) => Some(format!(r"\b(?:{c})")),
            (None, Some(s)) => Some(format!(r"(?:{s})")),
            (None, None) => None,
        };
        if let Some(prefix) = prefix {
            sources.push((
                format!(r"(?i){prefix}\s?{NUMBER}{scale}\b"),
                MONEY_LABEL,
                0,
            ));
        }

        // <number> [scale] <code|word>
        let suffix_terms: Vec<&str> = [codes.as_deref(), words.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !suffix_terms.is_empty() {
            sources.push((
                format!(
                    r"(?i)\b{NUMBER}{scale}\s?(?:{})\b",
                    suffix_terms.join("|")
                ),
                MONEY_LABEL,
                0,
            ));
        }

        // <number> <symbol>
        if let Some(s) = &symbols {
            sources.push((format!(r"(?i)\b{NUMBER}\s?(?:{s})"), MONEY_LABEL, 0));
        }

        if let Some(u) = &units {
            sources.push((
                format!(r"(?i)\b{NUMBER}\s?(?:{u})\b"),
                QUANTITY_LABEL,
                1,
            ));
        }

        sources.push((format!(r"\b{NUMBER}\b"), CARDINAL_LABEL, 2));

        let patterns = sources
            .into_iter()
            .map(|(pattern, label, rank)| {
                Regex::new(&pattern)
                    .map(|regex| EntityPattern { regex, label, rank })
                    .map_err(|e| Error::model_load(origin, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let name = raw
            .name
            .unwrap_or_else(|| default_name(origin).unwrap_or_else(|| "lexicon".to_string()));

        Ok(Self { name, patterns })
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        let mut candidates: Vec<(usize, usize, &'static str, u8)> = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                candidates.push((m.start(), m.end(), pattern.label, pattern.rank));
            }
        }

        // Leftmost, then longest, then best rank
        candidates.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| (b.1 - b.0).cmp(&(a.1 - a.0)))
                .then_with(|| a.3.cmp(&b.3))
        });

        let mut entities = Vec::new();
        let mut last_end = 0;
        for (start, end, label, _) in candidates {
            if start < last_end {
                continue;
            }
            entities.push(Entity {
                text: text[start..end].to_string(),
                label: label.to_string(),
                start,
                end,
            });
            last_end = end;
        }

        Ok(entities)
    }
}

/// Escaped regex alternation, longest terms first
fn alternation(terms: &[String]) -> Option<String> {
    let mut terms: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return None;
    }
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        terms
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn default_name(origin: &Path) -> Option<String> {
    let dir: PathBuf = origin.parent()?.to_path_buf();
    dir.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON: &str = r#"{
        "name": "money",
        "currency_codes": ["LKR", "EUR"],
        "currency_symbols": ["€", "£"],
        "currency_words": ["rupees", "dollars", "bucks"],
        "scale_words": ["k", "lakh"],
        "quantity_units": ["l", "kg", "km"]
    }"#;

    fn recognize(text: &str) -> Vec<(String, String)> {
        LexiconRecognizer::from_json(LEXICON)
            .unwrap()
            .recognize(text)
            .unwrap()
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn pair(text: &str, label: &str) -> (String, String) {
        (text.to_string(), label.to_string())
    }

    #[test]
    fn test_diesel_example() {
        assert_eq!(
            recognize("Diesel 20L – LKR 8,000"),
            vec![pair("20L", "QUANTITY"), pair("LKR 8,000", "MONEY")]
        );
    }

    #[test]
    fn test_money_forms() {
        assert_eq!(recognize("Got 1000 rupees"), vec![pair("1000 rupees", "MONEY")]);
        assert_eq!(recognize("Tickets €20 each"), vec![pair("€20", "MONEY")]);
        assert_eq!(recognize("Bonus 5k LKR"), vec![pair("5k LKR", "MONEY")]);
        assert_eq!(recognize("Rent LKR 1.5 lakh"), vec![pair("LKR 1.5 lakh", "MONEY")]);
        assert_eq!(recognize("paid 30 bucks"), vec![pair("30 bucks", "MONEY")]);
        assert_eq!(recognize("taxi 12 eur"), vec![pair("12 eur", "MONEY")]);
    }

    #[test]
    fn test_cardinals_and_quantities() {
        assert_eq!(
            recognize("Bought 5 kg rice and 3 apples"),
            vec![pair("5 kg", "QUANTITY"), pair("3", "CARDINAL")]
        );
    }

    #[test]
    fn test_offsets_are_byte_offsets() {
        let text = "Diesel 20L – LKR 8,000";
        let entities = LexiconRecognizer::from_json(LEXICON)
            .unwrap()
            .recognize(text)
            .unwrap();
        let money = &entities[1];
        assert_eq!(&text[money.start..money.end], "LKR 8,000");
    }

    #[test]
    fn test_nothing_to_recognize() {
        assert!(recognize("").is_empty());
        assert!(recognize("Coffee with friends").is_empty());
    }

    #[test]
    fn test_rejects_lexicon_without_currency_terms() {
        let err = LexiconRecognizer::from_json(r#"{ "quantity_units": ["kg"] }"#).unwrap_err();
        assert!(matches!(err, Error::ModelLoad { .. }));
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(LexiconRecognizer::from_json("{ not json").is_err());
    }
}
