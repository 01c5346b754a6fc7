//! Engine configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix of the per-category storage key (`<prefix><category>`)
    pub storage_key_prefix: String,
    /// Language used when the caller supplies none
    pub default_language: String,
    /// Number of upcoming steps suggested after the current one
    pub next_steps_limit: usize,
    /// Directory of the file-backed store
    pub state_dir: PathBuf,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML config file
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// With storage key prefix
    #[inline]
    #[must_use]
    pub fn with_storage_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_key_prefix = prefix.into();
        self
    }

    /// With default language
    #[inline]
    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// With next-steps limit
    #[inline]
    #[must_use]
    pub fn with_next_steps_limit(mut self, limit: usize) -> Self {
        self.next_steps_limit = limit;
        self
    }

    /// With state directory
    #[inline]
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key_prefix: "workflow_".to_string(),
            default_language: "en".to_string(),
            next_steps_limit: 3,
            state_dir: PathBuf::from(".realty-workflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = EngineConfig::from_toml_str("default_language = \"de\"\n").unwrap();
        assert_eq!(config.default_language, "de");
        assert_eq!(config.storage_key_prefix, "workflow_");
        assert_eq!(config.next_steps_limit, 3);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml_str("colour = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/realty.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/realty.toml"));
    }
}
