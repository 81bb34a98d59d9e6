//! Error types for capture sources and monitor configuration.

use thiserror::Error;

use crate::query::Query;

/// Errors that can occur while loading configuration or fetching captures.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration is syntactically valid but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No command is configured for the requested query.
    #[error("no command configured for {0}")]
    MissingCommand(Query),

    /// The command exited unsuccessfully.
    #[error("{query} command failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        query: Query,
        code: Option<i32>,
        stderr: String,
    },

    /// The command did not finish within the configured timeout.
    #[error("{query} command timed out after {timeout_secs}s")]
    CommandTimeout { query: Query, timeout_secs: u64 },

    /// Every source in a fallback chain failed.
    #[error("no capture sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;
