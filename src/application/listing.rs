//! Listing accounting.
//!
//! Keeps [`StockExchange::live_in_market`] consistent with the number of
//! listings on the exchange. Every listing mutation recomputes the flag in
//! the same unit of work as the mutation itself, so the count read and the
//! flag write cannot race another writer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::exchange::require_exchange;
use super::stock::require_stock;
use crate::domain::exchange::StockExchange;
use crate::domain::id::{ExchangeId, StockId};
use crate::domain::listing::{is_live, ListingSummary};
use crate::error::{Error, Result};
use crate::port::outbound::store::{Store, StoreTx};

/// Recompute and persist the live flag of `exchange` inside `tx`.
///
/// Reads the current listing count and writes the flag only when it
/// changes, so calling this twice in a row leaves the exchange (including
/// its version) untouched the second time. Returns the exchange as it
/// stands afterwards.
///
/// # Errors
/// Propagates store failures, or [`Error::Conflict`] if `exchange` carries
/// a stale version.
pub fn recompute_live_status(tx: &mut dyn StoreTx, mut exchange: StockExchange) -> Result<StockExchange> {
    let listings = tx.count_listings(exchange.id)?;
    let live = is_live(listings);
    if exchange.live_in_market == live {
        debug!(exchange_id = %exchange.id, listings, live, "Live status unchanged");
        return Ok(exchange);
    }

    exchange.live_in_market = live;
    let updated = tx.update_exchange(&exchange)?;
    info!(
        exchange_id = %updated.id,
        listings,
        live,
        "Exchange live status changed"
    );
    Ok(updated)
}

/// Use cases for adding and removing listings.
pub struct ListingService<S> {
    store: Arc<S>,
}

impl<S: Store> ListingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List `stock` on `exchange`.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the exchange or the stock does not exist
    /// - [`Error::Duplicate`] if the stock is already listed there
    pub fn add(&self, exchange_id: ExchangeId, stock_id: StockId) -> Result<ListingSummary> {
        let summary = self.store.transaction(|tx| {
            let exchange = require_exchange(tx, exchange_id)?;
            let stock = require_stock(tx, stock_id)?;
            if tx.listing_exists(exchange_id, stock_id)? {
                return Err(already_listed(exchange_id, stock_id));
            }
            let listing = tx.insert_listing(exchange_id, stock_id, Utc::now())?;
            let exchange = recompute_live_status(tx, exchange)?;
            Ok(ListingSummary {
                exchange,
                stock,
                listed_at: listing.listed_at,
            })
        })?;

        info!(exchange_id = %exchange_id, stock_id = %stock_id, "Stock listed");
        Ok(summary)
    }

    /// Remove `stock` from `exchange`. Returns the exchange after the live
    /// flag was recomputed.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist or the stock is
    /// not listed on it.
    pub fn remove(&self, exchange_id: ExchangeId, stock_id: StockId) -> Result<StockExchange> {
        let exchange = self.store.transaction(|tx| {
            let exchange = require_exchange(tx, exchange_id)?;
            if !tx.delete_listing(exchange_id, stock_id)? {
                return Err(Error::not_found(
                    "listing",
                    format!("stock {stock_id} is not listed on stock exchange {exchange_id}"),
                ));
            }
            recompute_live_status(tx, exchange)
        })?;

        info!(exchange_id = %exchange_id, stock_id = %stock_id, "Stock delisted");
        Ok(exchange)
    }

    /// Recompute the live flag of one exchange in its own unit of work.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist.
    pub fn recompute(&self, exchange_id: ExchangeId) -> Result<StockExchange> {
        self.store.transaction(|tx| {
            let exchange = require_exchange(tx, exchange_id)?;
            recompute_live_status(tx, exchange)
        })
    }

    /// Number of listings on an exchange.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist.
    pub fn count(&self, exchange_id: ExchangeId) -> Result<u64> {
        self.store.transaction(|tx| {
            require_exchange(tx, exchange_id)?;
            tx.count_listings(exchange_id)
        })
    }
}

fn already_listed(exchange_id: ExchangeId, stock_id: StockId) -> Error {
    Error::Duplicate(format!(
        "stock {stock_id} is already listed on stock exchange {exchange_id}"
    ))
}
