//! Stock use cases.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::version::check_version;
use super::listing::recompute_live_status;
use crate::domain::exchange::StockExchange;
use crate::domain::id::StockId;
use crate::domain::page::{ExchangeSort, Page, PageRequest, StockSort};
use crate::domain::stock::{NewStock, PriceUpdate, Stock};
use crate::error::{Error, Result};
use crate::port::outbound::store::{ExchangeScope, StockScope, Store, StoreTx};

/// Load a stock or fail with [`Error::NotFound`].
pub(crate) fn require_stock(tx: &mut dyn StoreTx, id: StockId) -> Result<Stock> {
    tx.find_stock(id)?.ok_or_else(|| Error::not_found("stock", id))
}

/// Stock catalog operations.
pub struct StockService<S> {
    store: Arc<S>,
}

impl<S: Store> StockService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One page of all stocks.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn list(&self, request: &PageRequest<StockSort>) -> Result<Page<Stock>> {
        self.store
            .transaction(|tx| tx.page_stocks(StockScope::All, request))
    }

    /// # Errors
    /// [`Error::NotFound`] if the stock does not exist.
    pub fn get(&self, id: StockId) -> Result<Stock> {
        self.store.transaction(|tx| require_stock(tx, id))
    }

    /// Create a stock stamped with the current time.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn create(&self, stock: &NewStock) -> Result<Stock> {
        let stock = self
            .store
            .transaction(|tx| tx.insert_stock(stock, Utc::now()))?;
        info!(stock_id = %stock.id, name = %stock.name, price = %stock.current_price, "Stock created");
        Ok(stock)
    }

    /// Set the current price and refresh the update timestamp.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the stock does not exist
    /// - [`Error::Conflict`] if `update` names a version other than the
    ///   stored one, or another writer got there first
    pub fn update_price(&self, id: StockId, update: &PriceUpdate) -> Result<Stock> {
        let stock = self.store.transaction(|tx| {
            let mut stock = require_stock(tx, id)?;
            check_version("stock", id, update.expected_version(), stock.version)?;
            stock.current_price = update.price();
            stock.updated_at = Utc::now();
            tx.update_stock(&stock)
        })?;
        info!(stock_id = %id, price = %stock.current_price, version = stock.version, "Stock price updated");
        Ok(stock)
    }

    /// Delete a stock and its listings, then recompute the live flag of
    /// every exchange that listed it. Returns the deleted stock.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the stock does not exist.
    pub fn delete(&self, id: StockId) -> Result<Stock> {
        let (stock, affected) = self.store.transaction(|tx| {
            let stock = require_stock(tx, id)?;
            let affected = tx.exchanges_listing(id)?;
            tx.delete_listings_of_stock(id)?;
            tx.delete_stock(id)?;
            for exchange_id in &affected {
                if let Some(exchange) = tx.find_exchange(*exchange_id)? {
                    recompute_live_status(tx, exchange)?;
                }
            }
            Ok((stock, affected))
        })?;
        info!(stock_id = %id, exchanges = affected.len(), "Stock deleted");
        Ok(stock)
    }

    /// Page of exchanges the stock is listed on.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the stock does not exist.
    pub fn exchanges_listing(
        &self,
        id: StockId,
        request: &PageRequest<ExchangeSort>,
    ) -> Result<Page<StockExchange>> {
        self.store.transaction(|tx| {
            require_stock(tx, id)?;
            tx.page_exchanges(ExchangeScope::ListingStock(id), request)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::application::listing::ListingService;
    use crate::domain::exchange::NewExchange;
    use crate::domain::id::ExchangeId;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn services() -> (StockService<MemoryStore>, ListingService<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (
            StockService::new(Arc::clone(&store)),
            ListingService::new(Arc::clone(&store)),
            store,
        )
    }

    fn exchange(store: &MemoryStore, name: &str) -> ExchangeId {
        store
            .transaction(|tx| Ok(tx.insert_exchange(&NewExchange::try_new(name, "venue")?)?.id))
            .unwrap()
    }

    #[test]
    fn price_update_bumps_version_and_timestamp() {
        let (stocks, _, _) = services();
        let created = stocks
            .create(&NewStock::try_new("ACME", "Acme Corp", dec!(10)).unwrap())
            .unwrap();

        let updated = stocks
            .update_price(created.id, &PriceUpdate::try_new(dec!(12.50), None).unwrap())
            .unwrap();
        assert_eq!(updated.current_price, dec!(12.50));
        assert_eq!(updated.version, created.version + 1);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn stale_expected_version_is_rejected_without_writing() {
        let (stocks, _, _) = services();
        let created = stocks
            .create(&NewStock::try_new("ACME", "Acme Corp", dec!(10)).unwrap())
            .unwrap();

        let err = stocks
            .update_price(created.id, &PriceUpdate::try_new(dec!(11), Some(7)).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(stocks.get(created.id).unwrap().current_price, dec!(10));
    }

    #[test]
    fn missing_stock_is_not_found() {
        let (stocks, _, _) = services();
        let missing = StockId::new(404);
        assert_eq!(stocks.get(missing).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(stocks.delete(missing).unwrap_err().kind(), ErrorKind::NotFound);
        let update = PriceUpdate::try_new(dec!(1), None).unwrap();
        assert_eq!(
            stocks.update_price(missing, &update).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn delete_recomputes_every_affected_exchange() {
        let (stocks, listings, store) = services();
        let nyse = exchange(&store, "NYSE");
        let lse = exchange(&store, "LSE");

        let mut ids = Vec::new();
        for i in 0..10 {
            let stock = stocks
                .create(&NewStock::try_new(format!("S{i}"), "stock", dec!(1)).unwrap())
                .unwrap();
            listings.add(nyse, stock.id).unwrap();
            ids.push(stock.id);
        }
        listings.add(lse, ids[0]).unwrap();
        assert!(listings.recompute(nyse).unwrap().live_in_market);

        let deleted = stocks.delete(ids[0]).unwrap();
        assert_eq!(deleted.id, ids[0]);
        assert!(!listings.recompute(nyse).unwrap().live_in_market);
        assert_eq!(listings.count(nyse).unwrap(), 9);
        assert_eq!(listings.count(lse).unwrap(), 0);
    }

    #[test]
    fn exchanges_listing_requires_the_stock() {
        let (stocks, listings, store) = services();
        let nyse = exchange(&store, "NYSE");
        let stock = stocks
            .create(&NewStock::try_new("ACME", "Acme Corp", dec!(1)).unwrap())
            .unwrap();
        listings.add(nyse, stock.id).unwrap();

        let request = PageRequest::first(10).unwrap();
        let page = stocks.exchanges_listing(stock.id, &request).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, nyse);

        let err = stocks
            .exchanges_listing(StockId::new(99), &request)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
