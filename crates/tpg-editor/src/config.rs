//! Editor configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Editor controller configuration
///
/// Loadable from TOML; missing keys take their defaults.
///
/// ```toml
/// request_timeout_secs = 10
/// resync_on_failure = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Upper bound for one record store request
    pub request_timeout_secs: u64,
    /// Reload the graph after a failed write, in case it landed remotely
    pub resync_on_failure: bool,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With resync after failed writes
    #[inline]
    #[must_use]
    pub fn with_resync_on_failure(mut self, enabled: bool) -> Self {
        self.resync_on_failure = enabled;
        self
    }

    /// Request timeout as a `Duration`
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            resync_on_failure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = EditorConfig::new();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.resync_on_failure);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str("resync_on_failure = true").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.resync_on_failure);
    }

    #[test]
    fn rejects_bad_types() {
        let err = EditorConfig::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = 5").unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config, EditorConfig::new().with_request_timeout(5));

        let missing = EditorConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
