//! User accounts and authorities.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{bounded_text, DomainError};
use super::id::UserId;

const MAX_PERSON_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// A role label granting access to a group of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Authority {
    /// Granted to every registered user.
    #[serde(rename = "ROLE_USER")]
    User,
    /// Granted to the first user ever registered.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Authority {
    /// Label stored in the database and carried in token claims.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Authorities assigned at registration.
    #[must_use]
    pub fn initial_set(first_user: bool) -> Vec<Self> {
        if first_user {
            vec![Self::User, Self::Admin]
        } else {
            vec![Self::User]
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Self::User),
            "ROLE_ADMIN" => Ok(Self::Admin),
            other => Err(DomainError::UnknownAuthority {
                label: other.to_string(),
            }),
        }
    }
}

/// A registered user as persisted.
///
/// `password_hash` is a PHC string and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub authorities: Vec<Authority>,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

impl User {
    #[must_use]
    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authorities.contains(&authority)
    }
}

/// A user ready to insert: validated profile, hashed password, authorities.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub authorities: Vec<Authority>,
    pub created_at: DateTime<Utc>,
}

/// Validated registration request.
#[derive(Clone)]
pub struct Registration {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

impl Registration {
    /// Validate a registration request. The email is lowercased.
    ///
    /// # Errors
    /// Returns a [`DomainError`] for blank or oversized names, a malformed
    /// email, or a password outside `8..=128` characters.
    pub fn try_new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, DomainError> {
        let password_len = password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
            return Err(DomainError::FieldLength {
                field: "password",
                min: MIN_PASSWORD_LEN,
                max: MAX_PASSWORD_LEN,
                len: password_len,
            });
        }
        Ok(Self {
            first_name: bounded_text("firstName", first_name, 1, MAX_PERSON_NAME_LEN)?,
            last_name: bounded_text("lastName", last_name, 1, MAX_PERSON_NAME_LEN)?,
            email: normalize_email(email)?,
            password: password.to_string(),
        })
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login credentials. Only shape is checked here; correctness is decided by
/// the authentication service.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// # Errors
    /// Returns [`DomainError::EmptyField`] when either field is blank.
    pub fn try_new(email: &str, password: &str) -> Result<Self, DomainError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DomainError::EmptyField { field: "email" });
        }
        if password.is_empty() {
            return Err(DomainError::EmptyField { field: "password" });
        }
        Ok(Self {
            email: email.to_lowercase(),
            password: password.to_string(),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::EmptyField { field: "email" });
    }
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !valid {
        return Err(DomainError::InvalidEmail { email });
    }
    Ok(email)
}
