//! Persistence ports for the catalog and user accounts.
//!
//! All reads and writes go through [`Store::transaction`], which hands the
//! caller a [`StoreTx`] bound to one unit of work. Either every write made
//! through the handle becomes visible, or none does.

use chrono::{DateTime, Utc};

use crate::domain::exchange::{NewExchange, StockExchange};
use crate::domain::id::{ExchangeId, StockId};
use crate::domain::listing::Listing;
use crate::domain::page::{ExchangeSort, Page, PageRequest, StockSort};
use crate::domain::stock::{NewStock, Stock};
use crate::domain::user::{NewUser, User};
use crate::error::Result;

/// Which stocks a page query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockScope {
    All,
    /// Stocks listed on the exchange.
    OnExchange(ExchangeId),
}

/// Which exchanges a page query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeScope {
    All,
    /// Exchanges currently live in the market.
    Live,
    /// Exchanges that list the stock.
    ListingStock(StockId),
}

/// Operations available inside one unit of work.
///
/// Update methods compare the `version` carried by the argument with the
/// stored one and fail with [`crate::error::Error::Conflict`] on mismatch.
/// On success the stored version is incremented and the updated entity is
/// returned.
pub trait StoreTx {
    fn insert_stock(&mut self, stock: &NewStock, updated_at: DateTime<Utc>) -> Result<Stock>;

    fn find_stock(&mut self, id: StockId) -> Result<Option<Stock>>;

    fn page_stocks(&mut self, scope: StockScope, request: &PageRequest<StockSort>) -> Result<Page<Stock>>;

    fn count_stocks(&mut self) -> Result<u64>;

    /// Persist price and timestamp of `stock`.
    fn update_stock(&mut self, stock: &Stock) -> Result<Stock>;

    /// Delete a stock row. Returns false if it did not exist.
    fn delete_stock(&mut self, id: StockId) -> Result<bool>;

    fn insert_exchange(&mut self, exchange: &NewExchange) -> Result<StockExchange>;

    fn find_exchange(&mut self, id: ExchangeId) -> Result<Option<StockExchange>>;

    fn page_exchanges(
        &mut self,
        scope: ExchangeScope,
        request: &PageRequest<ExchangeSort>,
    ) -> Result<Page<StockExchange>>;

    /// Persist name, description and live flag of `exchange`.
    fn update_exchange(&mut self, exchange: &StockExchange) -> Result<StockExchange>;

    /// Delete an exchange and its listings. Returns false if it did not exist.
    fn delete_exchange(&mut self, id: ExchangeId) -> Result<bool>;

    /// Insert a listing. Fails with [`crate::error::Error::Duplicate`] if
    /// the pair already exists.
    fn insert_listing(
        &mut self,
        exchange: ExchangeId,
        stock: StockId,
        listed_at: DateTime<Utc>,
    ) -> Result<Listing>;

    fn listing_exists(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool>;

    /// Delete a listing. Returns false if the pair was not listed.
    fn delete_listing(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool>;

    fn count_listings(&mut self, exchange: ExchangeId) -> Result<u64>;

    /// Exchanges that list the stock, ascending and without repeats.
    fn exchanges_listing(&mut self, stock: StockId) -> Result<Vec<ExchangeId>>;

    /// Delete every listing of the stock. Returns the number removed.
    fn delete_listings_of_stock(&mut self, stock: StockId) -> Result<usize>;

    fn count_users(&mut self) -> Result<u64>;

    /// Look up a user by lowercased email.
    fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Insert a user with its authorities. Fails with
    /// [`crate::error::Error::Conflict`] if the email is taken.
    fn insert_user(&mut self, user: &NewUser) -> Result<User>;
}

/// A store that runs units of work.
pub trait Store: Send + Sync {
    /// Run `work` in a single all-or-nothing unit of work.
    ///
    /// Writes are committed only if `work` returns `Ok`. Units of work that
    /// write are serialized against each other, so a read followed by a
    /// write inside `work` cannot interleave with another writer.
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>;
}
