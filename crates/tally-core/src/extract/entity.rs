//! Named-entity recognizer fallback
//!
//! The recognizer is loaded lazily, on the first text that reaches this
//! strategy, and the outcome of that load is cached for the strategy's
//! lifetime. A failed load disables the fallback instead of being retried on
//! every call. Errors raised while recognizing a single text degrade to
//! "no match" as well.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use super::lexicon::LexiconRecognizer;
use super::{ExtractionMethod, ExtractionStrategy};
use crate::error::Result;

/// Entity label used for monetary amounts
pub const MONEY_LABEL: &str = "MONEY";

/// A labelled span of the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Span text, verbatim
    pub text: String,
    /// Entity class (e.g. MONEY, QUANTITY, CARDINAL)
    pub label: String,
    /// Byte offsets into the input
    pub start: usize,
    pub end: usize,
}

/// Trait implemented by entity recognizers
pub trait EntityRecognizer: Send + Sync {
    /// Entities found in the text, in text order
    fn recognize(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Deferred recognizer construction
pub type RecognizerLoader = Box<dyn Fn() -> Result<Arc<dyn EntityRecognizer>> + Send + Sync>;

/// Extraction strategy returning the first MONEY entity
pub struct EntityStrategy {
    source: String,
    loader: Option<RecognizerLoader>,
    recognizer: OnceLock<Option<Arc<dyn EntityRecognizer>>>,
}

impl EntityStrategy {
    /// Strategy with a lazily constructed recognizer
    ///
    /// `source` describes where the recognizer comes from (for logs).
    pub fn lazy(source: impl Into<String>, loader: RecognizerLoader) -> Self {
        Self {
            source: source.into(),
            loader: Some(loader),
            recognizer: OnceLock::new(),
        }
    }

    /// Strategy loading a `LexiconRecognizer` artifact on first use
    pub fn from_lexicon_path(path: &Path) -> Self {
        let path: PathBuf = path.to_path_buf();
        let source = path.display().to_string();
        Self::lazy(
            source,
            Box::new(move || {
                let recognizer = LexiconRecognizer::load(&path)?;
                Ok(Arc::new(recognizer) as Arc<dyn EntityRecognizer>)
            }),
        )
    }

    /// Strategy with an already loaded recognizer
    pub fn with_recognizer(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Some(recognizer));
        Self {
            source: "preloaded".to_string(),
            loader: None,
            recognizer: cell,
        }
    }

    /// Whether the recognizer is loaded and usable
    ///
    /// Triggers the load if it has not been attempted yet.
    pub fn is_available(&self) -> bool {
        self.recognizer().is_some()
    }

    fn recognizer(&self) -> Option<&Arc<dyn EntityRecognizer>> {
        self.recognizer
            .get_or_init(|| {
                let Some(loader) = self.loader.as_ref() else {
                    return None;
                };
                match loader() {
                    Ok(recognizer) => {
                        info!(source = %self.source, "Loaded entity recognizer");
                        Some(recognizer)
                    }
                    Err(e) => {
                        warn!(
                            source = %self.source,
                            error = %e,
                            "Entity recognizer unavailable, amount fallback disabled"
                        );
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl ExtractionStrategy for EntityStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ner
    }

    fn find(&self, text: &str) -> Option<String> {
        let recognizer = self.recognizer()?;
        match recognizer.recognize(text) {
            Ok(entities) => entities
                .into_iter()
                .find(|e| e.label.eq_ignore_ascii_case(MONEY_LABEL))
                .map(|e| e.text),
            Err(e) => {
                debug!(error = %e, input = %text, "Entity recognizer failed");
                None
            }
        }
    }
}
