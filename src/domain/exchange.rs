//! Stock exchange entity and its write requests.

use serde::Serialize;

use super::error::{bounded_text, DomainError};
use super::id::ExchangeId;

/// Maximum length of an exchange name or description, in characters.
pub const MAX_EXCHANGE_TEXT_LEN: usize = 30;

/// Minimum length of an exchange description, in characters.
pub const MIN_EXCHANGE_DESCRIPTION_LEN: usize = 3;

/// A stock exchange as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockExchange {
    pub id: ExchangeId,
    pub name: String,
    pub description: String,
    /// Derived from the listing count, see [`crate::domain::listing::is_live`].
    pub live_in_market: bool,
    /// Optimistic-concurrency counter, bumped on every persisted update.
    pub version: i32,
}

/// Validated request to create a stock exchange.
///
/// New exchanges start with no listings and are therefore never live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExchange {
    name: String,
    description: String,
}

impl NewExchange {
    /// Validate and build a creation request.
    ///
    /// # Errors
    /// Returns a [`DomainError`] when the name is blank or too long, or the
    /// description is outside `3..=30` characters.
    pub fn try_new(name: impl AsRef<str>, description: impl AsRef<str>) -> Result<Self, DomainError> {
        Ok(Self {
            name: validate_name(name.as_ref())?,
            description: validate_description(description.as_ref())?,
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
}

/// Validated partial update of a stock exchange.
///
/// Fields left as `None` keep their stored value. The live flag is never
/// written from the request; when present it must agree with the flag
/// derived from the listing count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeUpdate {
    name: Option<String>,
    description: Option<String>,
    live_in_market: Option<bool>,
    expected_version: Option<i32>,
}

impl ExchangeUpdate {
    /// Validate an update request.
    ///
    /// # Errors
    /// Returns a [`DomainError`] when a provided name or description fails
    /// the same bounds as creation.
    pub fn try_new(
        name: Option<&str>,
        description: Option<&str>,
        live_in_market: Option<bool>,
        expected_version: Option<i32>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: name.map(validate_name).transpose()?,
            description: description.map(validate_description).transpose()?,
            live_in_market,
            expected_version,
        })
    }

    #[must_use]
    pub const fn live_in_market(&self) -> Option<bool> {
        self.live_in_market
    }

    #[must_use]
    pub const fn expected_version(&self) -> Option<i32> {
        self.expected_version
    }

    /// Copy the provided text fields onto `exchange`.
    pub fn apply_to(&self, exchange: &mut StockExchange) {
        if let Some(name) = &self.name {
            exchange.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            exchange.description.clone_from(description);
        }
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    bounded_text("name", name, 1, MAX_EXCHANGE_TEXT_LEN)
}

fn validate_description(description: &str) -> Result<String, DomainError> {
    bounded_text(
        "description",
        description,
        MIN_EXCHANGE_DESCRIPTION_LEN,
        MAX_EXCHANGE_TEXT_LEN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange() -> StockExchange {
        StockExchange {
            id: ExchangeId::new(1),
            name: "NYSE".into(),
            description: "New York".into(),
            live_in_market: false,
            version: 0,
        }
    }

    #[test]
    fn new_exchange_requires_three_character_description() {
        assert!(NewExchange::try_new("NYSE", "NY").is_err());
        assert!(NewExchange::try_new("NYSE", "NYC").is_ok());
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let update = ExchangeUpdate::try_new(Some("Big Board"), None, None, None).unwrap();
        let mut target = exchange();
        update.apply_to(&mut target);
        assert_eq!(target.name, "Big Board");
        assert_eq!(target.description, "New York");
    }

    #[test]
    fn update_never_touches_live_flag() {
        let update = ExchangeUpdate::try_new(None, None, Some(true), None).unwrap();
        let mut target = exchange();
        update.apply_to(&mut target);
        assert!(!target.live_in_market);
        assert_eq!(update.live_in_market(), Some(true));
    }

    #[test]
    fn update_validates_description_bounds() {
        let result = ExchangeUpdate::try_new(None, Some("x"), None, None);
        assert!(matches!(result, Err(DomainError::FieldLength { .. })));
    }
}
