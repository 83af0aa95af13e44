//! Stock exchange use cases.

use std::sync::Arc;

use tracing::info;

use super::version::check_version;
use crate::domain::error::DomainError;
use crate::domain::exchange::{ExchangeUpdate, NewExchange, StockExchange};
use crate::domain::id::ExchangeId;
use crate::domain::listing::is_live;
use crate::domain::page::{ExchangeSort, Page, PageRequest, StockSort};
use crate::domain::stock::Stock;
use crate::error::{Error, Result};
use crate::port::outbound::store::{ExchangeScope, StockScope, Store, StoreTx};

/// Load an exchange or fail with [`Error::NotFound`].
pub(crate) fn require_exchange(tx: &mut dyn StoreTx, id: ExchangeId) -> Result<StockExchange> {
    tx.find_exchange(id)?
        .ok_or_else(|| Error::not_found("stock exchange", id))
}

/// Stock exchange operations.
pub struct ExchangeService<S> {
    store: Arc<S>,
}

impl<S: Store> ExchangeService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Propagates store failures.
    pub fn list(&self, request: &PageRequest<ExchangeSort>) -> Result<Page<StockExchange>> {
        self.store
            .transaction(|tx| tx.page_exchanges(ExchangeScope::All, request))
    }

    /// Page of exchanges that are currently live in the market.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn list_live(&self, request: &PageRequest<ExchangeSort>) -> Result<Page<StockExchange>> {
        self.store
            .transaction(|tx| tx.page_exchanges(ExchangeScope::Live, request))
    }

    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist.
    pub fn get(&self, id: ExchangeId) -> Result<StockExchange> {
        self.store.transaction(|tx| require_exchange(tx, id))
    }

    /// Create an exchange. New exchanges have no listings and are not live.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn create(&self, exchange: &NewExchange) -> Result<StockExchange> {
        let exchange = self
            .store
            .transaction(|tx| tx.insert_exchange(exchange))?;
        info!(exchange_id = %exchange.id, name = %exchange.name, "Stock exchange created");
        Ok(exchange)
    }

    /// Apply name and description changes, then re-derive the live flag
    /// from the listing count.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the exchange does not exist
    /// - [`Error::Conflict`] on a version mismatch
    /// - [`Error::Validation`] if the request asks for a live flag the
    ///   listing count does not support
    pub fn update(&self, id: ExchangeId, update: &ExchangeUpdate) -> Result<StockExchange> {
        let exchange = self.store.transaction(|tx| {
            let mut exchange = require_exchange(tx, id)?;
            check_version("stock exchange", id, update.expected_version(), exchange.version)?;

            let listings = tx.count_listings(id)?;
            let derived = is_live(listings);
            if update.live_in_market().is_some_and(|requested| requested != derived) {
                return Err(DomainError::LiveFlagMismatch { listings, derived }.into());
            }

            update.apply_to(&mut exchange);
            exchange.live_in_market = derived;
            tx.update_exchange(&exchange)
        })?;
        info!(exchange_id = %id, version = exchange.version, "Stock exchange updated");
        Ok(exchange)
    }

    /// Delete an exchange and its listings. Stocks are left in place.
    /// Returns the deleted exchange.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist.
    pub fn delete(&self, id: ExchangeId) -> Result<StockExchange> {
        let exchange = self.store.transaction(|tx| {
            let exchange = require_exchange(tx, id)?;
            tx.delete_exchange(id)?;
            Ok(exchange)
        })?;
        info!(exchange_id = %id, "Stock exchange deleted");
        Ok(exchange)
    }

    /// Page of stocks listed on the exchange.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the exchange does not exist.
    pub fn stocks_listed(&self, id: ExchangeId, request: &PageRequest<StockSort>) -> Result<Page<Stock>> {
        self.store.transaction(|tx| {
            require_exchange(tx, id)?;
            tx.page_stocks(StockScope::OnExchange(id), request)
        })
    }
}
