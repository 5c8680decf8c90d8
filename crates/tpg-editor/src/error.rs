//! Error types for the editor
//!
//! Provides error handling for:
//! - Gestures refused by the consistency guard
//! - Failed calls to the record store
//! - Results arriving after the editor was unmounted
//! - Unreadable configuration

use tpg_graph::Rejection;

/// Main editor error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Local validation refused the mutation; nothing was sent
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// The record store call failed; the local graph is unchanged
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// The editor was unmounted; the result was discarded
    #[error("editor detached")]
    Detached,
}

impl EditorError {
    /// Check if retrying the same gesture can succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// The guard's reason, if this is a local rejection
    #[inline]
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The backend refused or failed the request
    #[error("backend error: {0}")]
    Backend(String),

    /// The request did not complete in time
    #[error("request timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// The record does not exist remotely
    #[error("record not found")]
    NotFound,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for [`EditorConfig`](crate::EditorConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_persistence_failures_are_retryable() {
        assert!(EditorError::Persistence(PersistenceError::NotFound).is_retryable());
        assert!(!EditorError::Rejected(Rejection::SelfLoop).is_retryable());
        assert!(!EditorError::Detached.is_retryable());
    }

    #[test]
    fn rejection_accessor() {
        let err = EditorError::from(Rejection::WouldCreateCycle);
        assert_eq!(err.rejection(), Some(&Rejection::WouldCreateCycle));
        assert!(err.to_string().contains("cycle"));
        assert_eq!(EditorError::Detached.rejection(), None);
    }

    #[test]
    fn timeout_display() {
        let err = PersistenceError::Timeout { duration_secs: 5 };
        assert_eq!(err.to_string(), "request timed out after 5s");
    }
}
