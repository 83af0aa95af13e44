//! Authentication settings.

use std::fmt;

use chrono::Duration;
use serde::Deserialize;

use crate::application::auth::TokenSettings;
use crate::error::{ConfigError, Result};

/// Environment variable holding the token signing secret.
pub const JWT_SECRET_ENV: &str = "STOCKEX_JWT_SECRET";
/// Environment variable naming a file that holds the signing secret.
pub const JWT_SECRET_FILE_ENV: &str = "STOCKEX_JWT_SECRET_FILE";
/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// HS256 signing key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(<{} bytes>)", self.0.len())
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Token lifetimes, hashing cost and the signing secret.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub password: PasswordConfig,
    /// Loaded from the environment, never from the config file.
    #[serde(skip)]
    pub jwt_secret: Option<SigningSecret>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            password: PasswordConfig::default(),
            jwt_secret: None,
        }
    }
}

fn ttl(field: &'static str, secs: u64) -> Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field,
                reason: format!("{secs} seconds is out of range"),
            }
            .into()
        })
}

impl AuthConfig {
    /// Token settings for the auth service.
    ///
    /// # Errors
    /// [`ConfigError::MissingField`] when no signing secret was provided.
    pub fn token_settings(&self) -> Result<TokenSettings> {
        let secret = self
            .jwt_secret
            .as_ref()
            .ok_or(ConfigError::MissingField {
                field: JWT_SECRET_ENV,
            })?;
        Ok(TokenSettings {
            secret: secret.expose().to_vec(),
            access_ttl: ttl("access_token_ttl_secs", self.access_token_ttl_secs)?,
            refresh_ttl: ttl("refresh_token_ttl_secs", self.refresh_token_ttl_secs)?,
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.access_token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "access_token_ttl_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.refresh_token_ttl_secs < self.access_token_ttl_secs {
            return Err(ConfigError::InvalidValue {
                field: "refresh_token_ttl_secs",
                reason: "must be >= access_token_ttl_secs".to_string(),
            }
            .into());
        }
        ttl("access_token_ttl_secs", self.access_token_ttl_secs)?;
        ttl("refresh_token_ttl_secs", self.refresh_token_ttl_secs)?;

        let password = &self.password;
        if password.iterations == 0 || password.parallelism == 0 {
            return Err(ConfigError::InvalidValue {
                field: "password",
                reason: "iterations and parallelism must be greater than 0".to_string(),
            }
            .into());
        }
        if password.memory_kib < 8 * password.parallelism {
            return Err(ConfigError::InvalidValue {
                field: "memory_kib",
                reason: "must be at least 8 KiB per lane".to_string(),
            }
            .into());
        }

        if let Some(secret) = &self.jwt_secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::InvalidValue {
                    field: JWT_SECRET_ENV,
                    reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
                }
                .into());
            }
        }
        Ok(())
    }
}
