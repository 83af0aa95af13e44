//! Listing association between stocks and exchanges.
//!
//! A listing means "this stock trades on this exchange". The pair
//! `(exchange_id, stock_id)` is unique. An exchange is live in the market
//! once it carries [`LIVE_LISTING_THRESHOLD`] listings; there is no
//! hysteresis, so the flag follows the count across the boundary in both
//! directions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::exchange::StockExchange;
use super::id::{ExchangeId, StockId};
use super::stock::Stock;

/// Number of listings at which an exchange becomes live.
pub const LIVE_LISTING_THRESHOLD: u64 = 10;

/// Whether an exchange with `listings` listings is live in the market.
#[must_use]
pub const fn is_live(listings: u64) -> bool {
    listings >= LIVE_LISTING_THRESHOLD
}

/// A persisted listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub exchange_id: ExchangeId,
    pub stock_id: StockId,
    pub listed_at: DateTime<Utc>,
}

/// Result of adding a listing: both parents as they stand after the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub exchange: StockExchange,
    pub stock: Stock,
    pub listed_at: DateTime<Utc>,
}
