//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TERRA_API_URL` - Base URL of the admin backend (e.g. `https://shop.example/api`)
//!
//! ## Optional
//! - `TERRA_STATE_DIR` - Directory for durable console state (default: `.terra`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// File name of the persisted session record. The namespace is fixed: every
/// console process on a machine shares the same record.
const SESSION_FILE: &str = "admin-auth.json";

const DEFAULT_STATE_DIR: &str = ".terra";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the admin backend.
    pub api_url: Url,
    /// Directory holding durable console state.
    pub state_dir: PathBuf,
}

impl ConsoleConfig {
    /// Build a configuration without touching the environment.
    #[must_use]
    pub fn new(api_url: Url, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url,
            state_dir: state_dir.into(),
        }
    }

    /// Load the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `TERRA_API_URL` is unset and
    /// `ConfigError::InvalidEnvVar` if it does not parse as a URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("TERRA_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("TERRA_API_URL".to_owned()))?;
        let api_url = Url::parse(&raw)
            .map_err(|err| ConfigError::InvalidEnvVar("TERRA_API_URL".to_owned(), err.to_string()))?;

        let state_dir = std::env::var("TERRA_STATE_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        Ok(Self { api_url, state_dir })
    }

    /// Path of the durable session record.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_file_under_state_dir() {
        let config = ConsoleConfig::new(
            Url::parse("http://localhost:4000/api").expect("valid url"),
            "/var/lib/terra",
        );
        assert_eq!(
            config.session_file(),
            PathBuf::from("/var/lib/terra/admin-auth.json")
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("TERRA_API_URL".to_owned());
        assert_eq!(err.to_string(), "Missing environment variable: TERRA_API_URL");
    }
}
