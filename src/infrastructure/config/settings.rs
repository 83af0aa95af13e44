//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the token signing secret comes
//! only from `STOCKEX_JWT_SECRET` or the file named by
//! `STOCKEX_JWT_SECRET_FILE`.
//!
//! # Example
//!
//! ```no_run
//! use stockex::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::auth::{AuthConfig, SigningSecret, JWT_SECRET_ENV, JWT_SECRET_FILE_ENV};
use super::database::DatabaseConfig;
use super::logging::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite location and pool size.
    pub database: DatabaseConfig,

    /// Logging and tracing configuration.
    pub logging: LoggingConfig,

    /// Token lifetimes and password hashing cost.
    pub auth: AuthConfig,
}

fn read_signing_secret(env: &dyn Fn(&str) -> Option<String>) -> Result<Option<SigningSecret>> {
    if let Some(secret) = env(JWT_SECRET_ENV) {
        return Ok(Some(SigningSecret::new(secret.trim())));
    }
    if let Some(path) = env(JWT_SECRET_FILE_ENV) {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let secret = contents.trim();
        if secret.is_empty() {
            return Err(ConfigError::MissingField {
                field: JWT_SECRET_FILE_ENV,
            }
            .into());
        }
        return Ok(Some(SigningSecret::new(secret)));
    }
    Ok(None)
}

impl Config {
    /// Parse configuration from TOML content, reading the signing secret
    /// from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - The secret file cannot be read
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, &|key| std::env::var(key).ok())
    }

    /// Parse configuration from TOML content with an explicit environment
    /// lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::parse_toml`].
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env(content: &str, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Never from the config file
        config.auth.jwt_secret = read_signing_secret(env)?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from a TOML file, or use defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for a file that exists.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_connections",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected pretty or json, got {}", self.logging.format),
            }
            .into());
        }
        self.auth.validate()
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
