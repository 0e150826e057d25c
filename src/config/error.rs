//! Failure taxonomy for config resolution
//!
//! None of these are surfaced to the launching application. They are logged
//! and collapse to "no configuration" at the public entry points.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File missing, permission denied or descriptor unusable
    #[error("failed to read config {}: {source}", .path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured document is not well-formed
    #[error(
        "config is not a valid json file offset {offset} (line {line}, column {column}): {message}"
    )]
    Syntax {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// Well-formed document with the wrong shape
    #[error("invalid config: {0}")]
    Schema(String),

    /// Valid configuration without an entry for the queried application
    #[error("no config entry for app: {app_name}")]
    NoMatch { app_name: String },
}

impl ConfigError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Log at the level this failure class warrants
    pub(crate) fn log(&self) {
        match self {
            Self::Access { .. } | Self::NoMatch { .. } => log::debug!("{}", self),
            Self::Syntax { .. } | Self::Schema(_) => log::error!("{}", self),
        }
    }
}
