//! Error types for the workflow engine
//!
//! None of these are fatal. Engine operations turn [`WorkflowError`] into a
//! logged diagnostic and a skipped [`Outcome`](crate::Outcome); only
//! configuration loading and import report errors to the caller.

use realty_catalog::WorkflowCategory;
use std::path::PathBuf;

/// Persistence backend failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem access failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be encoded
    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons an engine operation is skipped
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Category missing from the catalog
    #[error("category {0} is not in the catalog")]
    UnknownCategory(WorkflowCategory),

    /// Step id not found in the category
    #[error("step {step} does not exist in category {category}")]
    UnknownStep {
        /// Category the step belongs to
        category: WorkflowCategory,
        /// Offending step id
        step: String,
    },

    /// Step has unmet dependencies
    #[error("step {step} in category {category} is blocked by {missing:?}")]
    Blocked {
        /// Category the step belongs to
        category: WorkflowCategory,
        /// Offending step id
        step: String,
        /// Dependencies not yet completed
        missing: Vec<String>,
    },

    /// State could not be persisted
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Check if the error comes from a bad step or category reference
    #[inline]
    #[must_use]
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::UnknownCategory(_) | Self::UnknownStep { .. })
    }
}

/// Export and import failures
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Import text is not JSON
    #[error("import file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Import document is not a JSON object
    #[error("import document must be a JSON object")]
    NotAnObject,

    /// A recognized category entry has the wrong shape
    #[error("invalid entry for category {category}: {reason}")]
    InvalidCategory {
        /// Category key of the entry
        category: WorkflowCategory,
        /// Decoder message
        reason: String,
    },

    /// Reading or writing the transfer file failed
    #[error("transfer file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Imported state could not be persisted
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
