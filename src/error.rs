use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::user::Authority;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Authentication and authorization failures.
///
/// `InvalidCredentials` is deliberately non-specific: an unknown email and a
/// wrong password produce the same value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {required} required")]
    Forbidden { required: Authority },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("password hashing error: {0}")]
    Hashing(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse outcome classes the request boundary maps to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    Conflict,
    Validation,
    InvalidCredentials,
    Expired,
    InvalidToken,
    Unauthenticated,
    Forbidden,
    Internal,
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Classify this error for the request boundary.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(auth) => match auth {
                AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
                AuthError::Expired => ErrorKind::Expired,
                AuthError::InvalidToken(_) => ErrorKind::InvalidToken,
                AuthError::Unauthenticated => ErrorKind::Unauthenticated,
                AuthError::Forbidden { .. } => ErrorKind::Forbidden,
            },
            Self::Config(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::Connection(_)
            | Self::Database(_)
            | Self::Parse(_)
            | Self::Hashing(_) => ErrorKind::Internal,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
