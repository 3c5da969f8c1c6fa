//! Pipeline configuration
//!
//! Loads `pipeline.toml` from (in order):
//! 1. An explicit path (`--config`)
//! 2. The `TALLY_CONFIG` environment variable
//! 3. `~/.local/share/tally/config/pipeline.toml` (if present)
//! 4. The embedded default (`config/pipeline.toml`)
//!
//! Relative artifact and audit paths in a config file are resolved against
//! the file's directory. The embedded default resolves against the working
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config
const DEFAULT_CONFIG: &str = include_str!("../../../config/pipeline.toml");

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "TALLY_CONFIG";

/// Default JSONL audit file name
pub const DEFAULT_JSONL_AUDIT: &str = "tally_audit.jsonl";

/// Default SQLite audit database name
pub const DEFAULT_SQLITE_AUDIT: &str = "tally_audit.db";

/// One classifier slot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Result key (e.g. "type", "category")
    pub role: String,
    /// Model artifact directory or `model.json` file
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Amount extraction strategies, tried in the configured order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Pattern,
    Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,
    /// Custom amount regex replacing the built-in currency pattern
    #[serde(default)]
    pub pattern: Option<String>,
    /// Entity recognizer artifact (directory or `lexicon.json`)
    #[serde(default)]
    pub entity_model: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            pattern: None,
            entity_model: None,
        }
    }
}

/// Where audit records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    #[default]
    Tracing,
    Jsonl,
    Sqlite,
    Memory,
}

impl AuditSinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tracing => "tracing",
            Self::Jsonl => "jsonl",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    #[serde(default)]
    pub sink: AuditSinkKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// File path for file-backed sinks, falling back to the default name
    pub fn file_path(&self) -> Option<PathBuf> {
        match self.sink {
            AuditSinkKind::Jsonl => Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_JSONL_AUDIT)),
            ),
            AuditSinkKind::Sqlite => Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_AUDIT)),
            ),
            AuditSinkKind::Tracing | AuditSinkKind::Memory => None,
        }
    }
}

/// Parsed pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub classifiers: Vec<ClassifierConfig>,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    /// File the config was read from (None for the embedded default)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PipelineConfig {
    /// Resolve and load the active configuration
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            if !env_path.trim().is_empty() {
                return Self::from_file(Path::new(env_path.trim()));
            }
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        debug!("Using embedded pipeline config");
        Self::embedded()
    }

    /// The compiled-in default
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Load a config file, resolving relative paths against its directory
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        config.source = Some(path.to_path_buf());

        debug!(path = %path.display(), "Loaded pipeline config");
        Ok(config)
    }

    /// Parse TOML without touching any paths
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Make every relative path absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for classifier in &mut self.classifiers {
            classifier.path = resolve(base, &classifier.path);
        }
        if let Some(model) = self.extraction.entity_model.as_mut() {
            *model = resolve(base, model);
        }
        // Default audit names land next to the config as well
        if let Some(path) = self.audit.file_path() {
            self.audit.path = Some(resolve(base, &path));
        }
    }

    /// Classifier slots that are switched on, in configured order
    pub fn enabled_classifiers(&self) -> impl Iterator<Item = &ClassifierConfig> {
        self.classifiers.iter().filter(|c| c.enabled)
    }

    fn validate(&self) -> Result<()> {
        let mut roles: Vec<&str> = Vec::new();
        for classifier in self.enabled_classifiers() {
            let role = classifier.role.trim();
            if role.is_empty() {
                return Err(Error::Config("classifier role must not be empty".into()));
            }
            if roles.contains(&role) {
                return Err(Error::Config(format!("duplicate classifier role '{}'", role)));
            }
            roles.push(role);
        }

        let mut seen: Vec<StrategyKind> = Vec::new();
        for strategy in &self.extraction.strategies {
            if seen.contains(strategy) {
                return Err(Error::Config(format!(
                    "extraction strategy {:?} listed twice",
                    strategy
                )));
            }
            seen.push(*strategy);
        }

        if seen.contains(&StrategyKind::Entity) && self.extraction.entity_model.is_none() {
            return Err(Error::Config(
                "extraction strategy 'entity' requires extraction.entity_model".into(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("pipeline.toml"))
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn default_true() -> bool {
    true
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![StrategyKind::Pattern]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = PipelineConfig::embedded().unwrap();
        let roles: Vec<&str> = config
            .enabled_classifiers()
            .map(|c| c.role.as_str())
            .collect();
        assert_eq!(roles, vec!["type", "category"]);
        assert_eq!(
            config.extraction.strategies,
            vec![StrategyKind::Pattern, StrategyKind::Entity]
        );
        assert!(config.extraction.entity_model.is_some());
        assert!(config.source.is_none());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert!(config.classifiers.is_empty());
        assert_eq!(config.extraction.strategies, vec![StrategyKind::Pattern]);
        assert_eq!(config.audit.sink, AuditSinkKind::Tracing);
        assert_eq!(config.audit.file_path(), None);
    }

    #[test]
    fn test_entity_strategy_requires_model() {
        let err = PipelineConfig::from_toml(
            r#"
            [extraction]
            strategies = ["pattern", "entity"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = PipelineConfig::from_toml(
            r#"
            [extraction]
            strategies = ["entity", "pattern"]
            entity_model = "models/money"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.extraction.strategies,
            vec![StrategyKind::Entity, StrategyKind::Pattern]
        );
    }

    #[test]
    fn test_rejects_duplicate_roles() {
        let toml = r#"
            [extraction]
            strategies = []

            [[classifiers]]
            role = "category"
            path = "a"

            [[classifiers]]
            role = "category"
            path = "b"
        "#;
        assert!(matches!(
            PipelineConfig::from_toml(toml),
            Err(Error::Config(_))
        ));

        // A disabled duplicate is fine
        let toml = toml.replace("path = \"b\"", "path = \"b\"\nenabled = false");
        let config = PipelineConfig::from_toml(&toml).unwrap();
        assert_eq!(config.enabled_classifiers().count(), 1);
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(PipelineConfig::from_toml("[audit]\nsink = \"kafka\"").is_err());
        assert!(PipelineConfig::from_toml("[extraction]\nstrategies = [\"ocr\"]").is_err());
        assert!(PipelineConfig::from_toml("not toml [").is_err());
    }

    #[test]
    fn test_rejects_misspelled_classifier_keys() {
        let toml = r#"
            [extraction]
            strategies = []

            [[classifiers]]
            role = "type"
            path = "models/type"
            enable = false
        "#;
        let err = PipelineConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("enable"));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(
            &path,
            r#"
            [[classifiers]]
            role = "category"
            path = "models/category"

            [[classifiers]]
            role = "type"
            path = "/opt/models/type"

            [extraction]
            entity_model = "models/money"

            [audit]
            sink = "sqlite"
            "#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.classifiers[0].path, dir.path().join("models/category"));
        assert_eq!(config.classifiers[1].path, PathBuf::from("/opt/models/type"));
        assert_eq!(
            config.extraction.entity_model,
            Some(dir.path().join("models/money"))
        );
        assert_eq!(
            config.audit.file_path(),
            Some(dir.path().join(DEFAULT_SQLITE_AUDIT))
        );
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
