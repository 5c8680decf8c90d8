//! Command errors

use std::path::PathBuf;
use tpg_editor::EditorError;

/// Errors raised while running a `tpg` command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Snapshot file could not be read or written
    #[error("snapshot {path}: {source}")]
    Io {
        /// Snapshot path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not valid JSON of the expected shape
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// No parameter with this id or slug
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// No option with this id or label under the parameter
    #[error("unknown option '{option}' of parameter '{parameter}'")]
    UnknownOption {
        /// Parameter as given
        parameter: String,
        /// Option as given
        option: String,
    },

    /// A `--select` value not of the form `parameter=option`
    #[error("malformed selection '{0}', expected parameter=option")]
    MalformedSelection(String),

    /// The editor refused or failed the edit
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl CliError {
    /// Whether running the same command again may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Editor(err) if err.is_retryable())
    }
}
