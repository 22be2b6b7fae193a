//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Extractor
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Input sent to the engine is cut to this many characters
    pub max_input_chars: usize,

    /// Raw-text fallback output is cut to this many characters
    pub max_fallback_chars: usize,

    /// HTTP request timeout for the engine (seconds)
    pub request_timeout_secs: u64,

    /// Attempts per engine call on transient failures
    pub max_attempts: u32,

    /// Override for the hosted API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_base_url: Option<String>,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_input_chars == 0 {
            return Err(ExtractorError::Config("max_input_chars must be greater than 0".to_string()));
        }
        if self.max_fallback_chars == 0 {
            return Err(ExtractorError::Config("max_fallback_chars must be greater than 0".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExtractorError::Config("request_timeout_secs must be greater than 0".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(ExtractorError::Config("max_attempts must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Default configuration file location (`~/.kcache/extract.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kcache").join("extract.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present, otherwise built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ExtractorError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ExtractorError> {
        debug!(path = %path.display(), "Loading extractor config");
        let contents = fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 200_000,
            max_fallback_chars: 50_000,
            request_timeout_secs: 300,
            max_attempts: 1,
            hosted_base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_input_chars, 200_000);
        assert_eq!(config.max_fallback_chars, 50_000);
    }

    #[test]
    fn test_invalid_max_input_chars() {
        let config = ExtractorConfig {
            max_input_chars: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_attempts() {
        let config = ExtractorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExtractorConfig::from_toml("request_timeout_secs = 30").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_input_chars, 200_000);
        assert!(config.hosted_base_url.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            hosted_base_url: Some("http://proxy".to_string()),
            ..Default::default()
        };
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_bad_toml() {
        assert!(ExtractorConfig::from_toml("max_attempts = \"many\"").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_fallback_chars = 10").unwrap();

        let config = ExtractorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.max_fallback_chars, 10);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = ExtractorConfig::load(Some(Path::new("/nonexistent/extract.toml")));
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_input_chars = 0").unwrap();
        assert!(ExtractorConfig::load(Some(file.path())).is_err());
    }
}
