//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new` constructors that validate inputs
//! before they reach a service or the store.
//!
//! # Examples
//!
//! Handling validation errors:
//!
//! ```
//! use stockex::domain::error::DomainError;
//! use stockex::domain::stock::NewStock;
//! use rust_decimal_macros::dec;
//!
//! let result = NewStock::try_new("ACME", "Acme Corp", dec!(-1));
//!
//! assert!(matches!(result, Err(DomainError::NegativePrice { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
///
/// Surfaced to callers as a validation failure; nothing has been written
/// when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required text field was empty after trimming.
    #[error("{field} is mandatory")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field is shorter or longer than allowed.
    #[error("{field} must be between {min} and {max} characters, got {len}")]
    FieldLength {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed length in characters.
        min: usize,
        /// Maximum allowed length in characters.
        max: usize,
        /// Actual length in characters.
        len: usize,
    },

    /// Prices must be zero or greater.
    #[error("price must be zero or greater, got {price}")]
    NegativePrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },

    /// Email addresses must look like `local@domain`.
    #[error("invalid email address: {email}")]
    InvalidEmail {
        /// The rejected address.
        email: String,
    },

    /// Page size must be at least one.
    #[error("page size must be at least 1, got {size}")]
    InvalidPageSize {
        /// The rejected size.
        size: u32,
    },

    /// Sort key is not one of the keys the resource supports.
    #[error("unknown sort key '{key}', expected one of: {expected}")]
    UnknownSortKey {
        /// The rejected key.
        key: String,
        /// Comma separated list of accepted keys.
        expected: &'static str,
    },

    /// Authority label is not a known role.
    #[error("unknown authority '{label}'")]
    UnknownAuthority {
        /// The rejected label.
        label: String,
    },

    /// A requested live flag contradicts the listing count.
    #[error("liveInMarket is derived from listings: exchange has {listings} listing(s), so it must be {derived}")]
    LiveFlagMismatch {
        /// Current number of listings on the exchange.
        listings: u64,
        /// The flag value implied by the listing count.
        derived: bool,
    },
}

/// Validate a trimmed text field against inclusive character bounds.
pub(crate) fn bounded_text(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyField { field });
    }
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(DomainError::FieldLength {
            field,
            min,
            max,
            len,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_text_trims_whitespace() {
        assert_eq!(bounded_text("name", "  NYSE  ", 1, 30).unwrap(), "NYSE");
    }

    #[test]
    fn bounded_text_rejects_blank() {
        assert_eq!(
            bounded_text("name", "   ", 1, 30),
            Err(DomainError::EmptyField { field: "name" })
        );
    }

    #[test]
    fn bounded_text_counts_characters_not_bytes() {
        // 30 two-byte characters fit a 30 character bound.
        let value = "é".repeat(30);
        assert!(bounded_text("name", &value, 1, 30).is_ok());
    }

    #[test]
    fn bounded_text_rejects_too_short_and_too_long() {
        assert!(matches!(
            bounded_text("description", "ab", 3, 30),
            Err(DomainError::FieldLength { len: 2, .. })
        ));
        assert!(matches!(
            bounded_text("description", &"x".repeat(31), 3, 30),
            Err(DomainError::FieldLength { len: 31, .. })
        ));
    }
}
