//! Stock entity and its write requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{bounded_text, DomainError};
use super::id::StockId;

/// Maximum length of a stock name or description, in characters.
pub const MAX_STOCK_TEXT_LEN: usize = 30;

/// A stock as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: StockId,
    pub name: String,
    pub description: String,
    pub current_price: Decimal,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency counter, bumped on every persisted update.
    pub version: i32,
}

/// Validated request to create a stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStock {
    name: String,
    description: String,
    current_price: Decimal,
}

impl NewStock {
    /// Validate and build a creation request.
    ///
    /// # Errors
    /// Returns a [`DomainError`] when the name or description is blank or
    /// longer than [`MAX_STOCK_TEXT_LEN`], or the price is negative.
    pub fn try_new(
        name: impl AsRef<str>,
        description: impl AsRef<str>,
        current_price: Decimal,
    ) -> Result<Self, DomainError> {
        let name = bounded_text("name", name.as_ref(), 1, MAX_STOCK_TEXT_LEN)?;
        let description = bounded_text("description", description.as_ref(), 1, MAX_STOCK_TEXT_LEN)?;
        ensure_price(current_price)?;
        Ok(Self {
            name,
            description,
            current_price,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn current_price(&self) -> Decimal {
        self.current_price
    }
}

/// Validated request to change a stock's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    price: Decimal,
    expected_version: Option<i32>,
}

impl PriceUpdate {
    /// Validate a price change.
    ///
    /// When `expected_version` is set the update only applies if the stored
    /// stock still carries that version.
    ///
    /// # Errors
    /// Returns [`DomainError::NegativePrice`] for prices below zero.
    pub fn try_new(price: Decimal, expected_version: Option<i32>) -> Result<Self, DomainError> {
        ensure_price(price)?;
        Ok(Self {
            price,
            expected_version,
        })
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn expected_version(&self) -> Option<i32> {
        self.expected_version
    }
}

fn ensure_price(price: Decimal) -> Result<(), DomainError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::NegativePrice { price });
    }
    Ok(())
}
