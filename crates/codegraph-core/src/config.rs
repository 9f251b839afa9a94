//! Configuration (SPEC_FULL.md §4.12 / §6.3): a typed, `serde`+`toml`
//! struct with documented defaults, loadable from a file or built
//! programmatically. Grounded on `codeprysm-config`'s nested-section,
//! `#[serde(default)]`-per-struct shape, folded into the core crate since
//! standalone config-file *discovery* (global/local merge, `dirs::home_dir`)
//! is out of scope per spec.md §1 — this crate performs no file I/O to
//! *locate* a config file, only to parse one the caller names.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inference::CacheStrategy;
use crate::language::Language;

/// Errors raised loading or parsing a [`CodeGraphConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Root configuration (SPEC_FULL.md §6.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGraphConfig {
    /// Base path for relative identifiers.
    pub project_root: std::path::PathBuf,
    /// Subset of the supported languages to analyze.
    pub supported_languages: Vec<Language>,
    pub parser_recovery: ParserRecoveryConfig,
    pub inference: InferenceConfig,
    pub analyzer: AnalyzerConfig,
    pub store: StoreConfig,
}

impl Default for CodeGraphConfig {
    fn default() -> Self {
        Self {
            project_root: std::path::PathBuf::from("."),
            supported_languages: vec![
                Language::TypeScript,
                Language::Javascript,
                Language::Java,
                Language::Python,
                Language::Go,
                Language::Markdown,
            ],
            parser_recovery: ParserRecoveryConfig::default(),
            inference: InferenceConfig::default(),
            analyzer: AnalyzerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserRecoveryConfig {
    pub max_successive_uses_before_recreate: u32,
}

impl Default for ParserRecoveryConfig {
    fn default() -> Self {
        Self {
            max_successive_uses_before_recreate: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub cache: InferenceCacheConfig,
    pub default_max_path_length: u32,
    pub default_max_inheritance_depth: u32,
    pub detect_cycles: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            cache: InferenceCacheConfig::default(),
            default_max_path_length: 10,
            default_max_inheritance_depth: 5,
            detect_cycles: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceCacheConfig {
    pub enabled: bool,
    pub strategy: String,
}

impl Default for InferenceCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: "lazy".to_string(),
        }
    }
}

impl InferenceCacheConfig {
    pub fn parsed_strategy(&self) -> Result<CacheStrategy, ConfigError> {
        self.strategy
            .parse()
            .map_err(|message| ConfigError::InvalidValue {
                key: "inference.cache.strategy".to_string(),
                message,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub default_edge_types_to_clean: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_edge_types_to_clean: crate::analyzer::default_edge_types_to_clean()
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub connection_pool: ConnectionPoolConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_pool: ConnectionPoolConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionPoolConfig {
    pub size: u32,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self { size: 4 }
    }
}

impl CodeGraphConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|source| ConfigError::ParseToml {
            path: std::path::PathBuf::from("<string>"),
            source,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let config = CodeGraphConfig::default();
        assert_eq!(config.parser_recovery.max_successive_uses_before_recreate, 100);
        assert!(config.inference.cache.enabled);
        assert_eq!(config.inference.cache.strategy, "lazy");
        assert_eq!(config.inference.default_max_path_length, 10);
        assert_eq!(config.inference.default_max_inheritance_depth, 5);
        assert!(config.inference.detect_cycles);
        assert_eq!(config.store.connection_pool.size, 4);
        let cleaned: std::collections::HashSet<_> =
            config.analyzer.default_edge_types_to_clean.into_iter().collect();
        assert_eq!(
            cleaned,
            std::collections::HashSet::from([
                "imports".to_string(),
                "imports_library".to_string(),
                "imports_file".to_string(),
                "depends_on".to_string(),
            ])
        );
    }

    #[test]
    fn parses_a_partial_toml_document_with_field_defaults() {
        let toml = r#"
            project_root = "/repo"
            supported_languages = ["typescript", "python"]

            [inference]
            default_max_path_length = 20
        "#;
        let config = CodeGraphConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.project_root, std::path::PathBuf::from("/repo"));
        assert_eq!(config.supported_languages, vec![Language::TypeScript, Language::Python]);
        assert_eq!(config.inference.default_max_path_length, 20);
        // untouched nested defaults survive a partial override
        assert_eq!(config.inference.default_max_inheritance_depth, 5);
    }

    #[test]
    fn invalid_cache_strategy_string_is_rejected_on_use() {
        let config = InferenceCacheConfig {
            enabled: true,
            strategy: "sometimes".to_string(),
        };
        assert!(config.parsed_strategy().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = CodeGraphConfig::from_toml_str("not = [valid").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }
}
