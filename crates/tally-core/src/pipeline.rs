//! Prediction pipeline
//!
//! A `Predictor` holds the active classifiers (keyed by role), the amount
//! extractor and the audit sink. `predict` runs every classifier, extracts the
//! amount, resolves each distribution to its top label and appends one audit
//! record.
//!
//! ```ignore
//! let predictor = Predictor::builder()
//!     .with_classifier("type", Arc::new(LinearTextModel::load(type_dir)?))
//!     .with_classifier("category", Arc::new(LinearTextModel::load(category_dir)?))
//!     .with_extractor(AmountExtractor::pattern_only())
//!     .build()?;
//!
//! let result = predictor.predict("Lunch at canteen – Rs. 500")?;
//! assert_eq!(result.amount().as_str(), "Rs. 500");
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{error, info};

use crate::audit::{
    AuditSink, AuditStore, JsonlAuditSink, LabelDecision, MemoryAuditSink, PredictionRecord,
    TracingAuditSink,
};
use crate::classify::{LinearTextModel, TextClassifier};
use crate::config::{AuditSinkKind, PipelineConfig, StrategyKind};
use crate::error::{Error, Result};
use crate::extract::{
    AmountExtractor, EntityStrategy, ExtractionMethod, MoneyAmount, PatternStrategy,
};

/// Result key reserved for the extracted amount
const AMOUNT_KEY: &str = "amount";

/// A classifier bound to its role
#[derive(Clone)]
pub struct ActiveClassifier {
    pub role: String,
    pub classifier: Arc<dyn TextClassifier>,
}

/// Outcome of one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    labels: Vec<(String, String)>,
    amount: MoneyAmount,
    extraction_method: ExtractionMethod,
}

impl PredictionResult {
    /// Chosen label for a role
    pub fn label(&self, role: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, label)| label.as_str())
    }

    /// `(role, label)` pairs in classifier order
    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    /// Expense or Income, when a `type` classifier is configured
    pub fn transaction_type(&self) -> Option<&str> {
        self.label("type")
    }

    pub fn category(&self) -> Option<&str> {
        self.label("category")
    }

    pub fn amount(&self) -> &MoneyAmount {
        &self.amount
    }

    pub fn extraction_method(&self) -> ExtractionMethod {
        self.extraction_method
    }
}

/// Flat object: one key per role, then `amount`
impl Serialize for PredictionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len() + 1))?;
        for (role, label) in &self.labels {
            map.serialize_entry(role, label)?;
        }
        map.serialize_entry(AMOUNT_KEY, &self.amount)?;
        map.end()
    }
}

/// Classify-and-extract pipeline
pub struct Predictor {
    classifiers: Vec<ActiveClassifier>,
    extractor: AmountExtractor,
    audit: Arc<dyn AuditSink>,
    audit_store: Option<AuditStore>,
}

impl Predictor {
    pub fn builder() -> PredictorBuilder {
        PredictorBuilder::new()
    }

    /// Load every model and open the audit sink named by the config
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        PredictorBuilder::from_config(config)?.build()
    }

    /// Classify a description and extract its amount
    ///
    /// Every classifier is invoked. If any of them fails, each failure is
    /// logged and a single `Error::Prediction` is returned; no audit record
    /// is written. Audit write failures are logged and do not fail the call.
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let mut decisions = Vec::with_capacity(self.classifiers.len());
        let mut failed: Vec<&str> = Vec::new();

        for active in &self.classifiers {
            match active.classifier.classify(text) {
                Ok(scores) => {
                    decisions.push(LabelDecision::from_distribution(&active.role, scores))
                }
                Err(e) => {
                    error!(
                        classifier = %active.role,
                        error = %e,
                        input = %text,
                        "Classification failed"
                    );
                    failed.push(&active.role);
                }
            }
        }

        if !failed.is_empty() {
            return Err(Error::Prediction {
                reason: format!("classifier failed: {}", failed.join(", ")),
            });
        }

        let extraction = self.extractor.extract(text);

        let record = PredictionRecord {
            timestamp: Utc::now(),
            input: text.to_string(),
            decisions,
            amount: extraction.amount,
            extraction_method: extraction.method,
        };

        info!(input = %text, "{}", record.summary());

        if let Err(e) = self.audit.append(&record) {
            error!(error = %e, input = %text, "Failed to write audit record");
        }

        Ok(PredictionResult {
            labels: record
                .decisions
                .into_iter()
                .map(|d| (d.classifier, d.label))
                .collect(),
            amount: record.amount,
            extraction_method: record.extraction_method,
        })
    }

    /// Configured roles, in invocation order
    pub fn roles(&self) -> Vec<&str> {
        self.classifiers.iter().map(|c| c.role.as_str()).collect()
    }

    pub fn classifiers(&self) -> &[ActiveClassifier] {
        &self.classifiers
    }

    /// Label set of the classifier bound to `role`
    pub fn labels_for(&self, role: &str) -> Option<&[String]> {
        self.classifiers
            .iter()
            .find(|c| c.role == role)
            .map(|c| c.classifier.labels())
    }

    /// Extraction chain, in order
    pub fn extraction_methods(&self) -> Vec<ExtractionMethod> {
        self.extractor.methods()
    }

    /// Queryable audit store, when the SQLite sink is in use
    pub fn audit_store(&self) -> Option<&AuditStore> {
        self.audit_store.as_ref()
    }

    /// Flush the audit sink (call at shutdown)
    pub fn flush(&self) -> Result<()> {
        self.audit.flush()
    }
}

/// Builder for `Predictor`
#[derive(Default)]
pub struct PredictorBuilder {
    classifiers: Vec<ActiveClassifier>,
    extractor: Option<AmountExtractor>,
    audit: Option<Arc<dyn AuditSink>>,
    audit_store: Option<AuditStore>,
}

impl PredictorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated from a config (models are loaded here)
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut builder = Self::new();

        for slot in config.enabled_classifiers() {
            let model = LinearTextModel::load(&slot.path)?;
            info!(
                role = %slot.role,
                model = %model.name(),
                labels = model.labels().len(),
                "Loaded classifier"
            );
            builder = builder.with_classifier(slot.role.trim(), Arc::new(model));
        }

        let mut extractor = AmountExtractor::new();
        for strategy in &config.extraction.strategies {
            extractor = match strategy {
                StrategyKind::Pattern => match &config.extraction.pattern {
                    Some(pattern) => extractor.with_strategy(PatternStrategy::with_pattern(pattern)?),
                    None => extractor.with_strategy(PatternStrategy::new()),
                },
                StrategyKind::Entity => {
                    let path = config.extraction.entity_model.as_ref().ok_or_else(|| {
                        Error::Config("extraction.entity_model is not set".to_string())
                    })?;
                    extractor.with_strategy(EntityStrategy::from_lexicon_path(path))
                }
            };
        }
        builder = builder.with_extractor(extractor);

        let file = config.audit.file_path();
        builder = match (config.audit.sink, file) {
            (AuditSinkKind::Jsonl, Some(path)) => {
                builder.with_audit_sink(Arc::new(JsonlAuditSink::open(&path)?))
            }
            (AuditSinkKind::Sqlite, Some(path)) => builder.with_audit_store(AuditStore::open(&path)?),
            (AuditSinkKind::Memory, _) => builder.with_audit_sink(Arc::new(MemoryAuditSink::new())),
            _ => builder.with_audit_sink(Arc::new(TracingAuditSink)),
        };

        Ok(builder)
    }

    /// Add a classifier under `role` (invoked in insertion order)
    pub fn with_classifier(
        mut self,
        role: impl Into<String>,
        classifier: Arc<dyn TextClassifier>,
    ) -> Self {
        self.classifiers.push(ActiveClassifier {
            role: role.into(),
            classifier,
        });
        self
    }

    pub fn with_extractor(mut self, extractor: AmountExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self.audit_store = None;
        self
    }

    /// Use a SQLite store as the sink and expose it for queries
    pub fn with_audit_store(mut self, store: AuditStore) -> Self {
        self.audit = Some(Arc::new(store.clone()));
        self.audit_store = Some(store);
        self
    }

    pub fn build(self) -> Result<Predictor> {
        let mut roles: Vec<&str> = Vec::new();
        for active in &self.classifiers {
            let role = active.role.as_str();
            if role.is_empty() || role == AMOUNT_KEY {
                return Err(Error::Config(format!("invalid classifier role '{}'", role)));
            }
            if roles.contains(&role) {
                return Err(Error::Config(format!("duplicate classifier role '{}'", role)));
            }
            roles.push(role);
        }

        Ok(Predictor {
            classifiers: self.classifiers,
            extractor: self.extractor.unwrap_or_else(AmountExtractor::pattern_only),
            audit: self.audit.unwrap_or_else(|| Arc::new(TracingAuditSink)),
            audit_store: self.audit_store,
        })
    }
}
