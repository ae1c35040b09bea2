use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building an `IdentifierMap`.
#[derive(Debug, Error)]
pub enum IdMapError {
    /// The source could not be opened or read to completion.
    #[error("source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading a `KEY=VALUE` config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} not found in config")]
    MissingKey(String),
}
