//! Portal runtime configuration.
//!
//! # Invariants
//! - Missing keys take defaults; unknown keys are ignored.
//! - A config that passes `validate` can be handed to `init_logging` as-is.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::logging::{
    default_log_level, init_logging, normalize_level, normalize_log_dir, LoggingError,
};

/// Configuration loaded by hosts before the first portal call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Configuration load failures.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Io(std::io::Error),
    Invalid(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Io(err) => write!(f, "cannot read config: {err}"),
            Self::Invalid(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Invalid(value)
    }
}

impl PortalConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        normalize_level(&self.log_level)?;
        if let Some(dir) = &self.log_dir {
            normalize_log_dir(dir)?;
        }
        Ok(())
    }

    /// Starts file logging when a directory is configured.
    ///
    /// Returns whether file logging is active afterwards.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => {
                init_logging(&self.log_level, dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PortalConfig};
    use crate::logging::default_log_level;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PortalConfig::from_json_str("{}").expect("empty config");
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = PortalConfig::from_json_str(r#"{ "logLevel": "info", "logDir": "logs" }"#)
            .expect_err("relative dir must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("portal.json");
        std::fs::write(&path, r#"{ "logLevel": "WARN" }"#).expect("write config");
        let config = PortalConfig::load(&path).expect("load config");
        assert_eq!(config.log_level, "WARN");
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            PortalConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
