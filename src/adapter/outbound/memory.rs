//! In-memory store implementation for testing.
//!
//! A unit of work operates on a copy of the state taken under a mutex and
//! swaps it in only when the work succeeds, which gives the same
//! all-or-nothing and serialized-writer behavior as the SQLite store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::exchange::{NewExchange, StockExchange};
use crate::domain::id::{ExchangeId, StockId, UserId};
use crate::domain::listing::Listing;
use crate::domain::page::{ExchangeSort, Page, PageRequest, StockSort};
use crate::domain::stock::{NewStock, Stock};
use crate::domain::user::{NewUser, User};
use crate::error::{Error, Result};
use crate::port::outbound::store::{ExchangeScope, StockScope, Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct State {
    stocks: BTreeMap<StockId, Stock>,
    exchanges: BTreeMap<ExchangeId, StockExchange>,
    listings: BTreeMap<(ExchangeId, StockId), DateTime<Utc>>,
    users: BTreeMap<UserId, User>,
    last_stock_id: i32,
    last_exchange_id: i32,
    last_user_id: i32,
}

/// In-memory [`Store`] for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>,
    {
        let mut state = self.state.lock();
        let mut tx = MemoryTx {
            state: state.clone(),
        };
        let value = work(&mut tx)?;
        *state = tx.state;
        Ok(value)
    }
}

struct MemoryTx {
    state: State,
}

fn page_of<T, S: Copy>(
    mut items: Vec<T>,
    request: &PageRequest<S>,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    items.sort_by(compare);
    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let items = items
        .into_iter()
        .skip(offset)
        .take(request.size() as usize)
        .collect();
    request.respond(items, total)
}

fn stock_order(sort: StockSort) -> impl Fn(&Stock, &Stock) -> Ordering {
    move |a, b| {
        let primary = match sort {
            StockSort::Id => Ordering::Equal,
            StockSort::Name => a.name.cmp(&b.name),
            StockSort::Price => a.current_price.cmp(&b.current_price),
            StockSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

fn exchange_order(sort: ExchangeSort) -> impl Fn(&StockExchange, &StockExchange) -> Ordering {
    move |a, b| {
        let primary = match sort {
            ExchangeSort::Id => Ordering::Equal,
            ExchangeSort::Name => a.name.cmp(&b.name),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

impl StoreTx for MemoryTx {
    fn insert_stock(&mut self, stock: &NewStock, updated_at: DateTime<Utc>) -> Result<Stock> {
        self.state.last_stock_id += 1;
        let stock = Stock {
            id: StockId::new(self.state.last_stock_id),
            name: stock.name().to_string(),
            description: stock.description().to_string(),
            current_price: stock.current_price(),
            updated_at,
            version: 0,
        };
        self.state.stocks.insert(stock.id, stock.clone());
        Ok(stock)
    }

    fn find_stock(&mut self, id: StockId) -> Result<Option<Stock>> {
        Ok(self.state.stocks.get(&id).cloned())
    }

    fn page_stocks(&mut self, scope: StockScope, request: &PageRequest<StockSort>) -> Result<Page<Stock>> {
        let listings = &self.state.listings;
        let items: Vec<Stock> = self
            .state
            .stocks
            .values()
            .filter(|stock| match scope {
                StockScope::All => true,
                StockScope::OnExchange(exchange) => listings.contains_key(&(exchange, stock.id)),
            })
            .cloned()
            .collect();
        Ok(page_of(items, request, stock_order(request.sort())))
    }

    fn count_stocks(&mut self) -> Result<u64> {
        Ok(self.state.stocks.len() as u64)
    }

    fn update_stock(&mut self, stock: &Stock) -> Result<Stock> {
        let stored = self
            .state
            .stocks
            .get_mut(&stock.id)
            .ok_or_else(|| Error::not_found("stock", stock.id))?;
        if stored.version != stock.version {
            return Err(Error::Conflict(format!(
                "stock {} was modified concurrently",
                stock.id
            )));
        }
        stored.current_price = stock.current_price;
        stored.updated_at = stock.updated_at;
        stored.version += 1;
        Ok(stored.clone())
    }

    fn delete_stock(&mut self, id: StockId) -> Result<bool> {
        self.state.listings.retain(|(_, stock), _| *stock != id);
        Ok(self.state.stocks.remove(&id).is_some())
    }

    fn insert_exchange(&mut self, exchange: &NewExchange) -> Result<StockExchange> {
        self.state.last_exchange_id += 1;
        let exchange = StockExchange {
            id: ExchangeId::new(self.state.last_exchange_id),
            name: exchange.name().to_string(),
            description: exchange.description().to_string(),
            live_in_market: false,
            version: 0,
        };
        self.state.exchanges.insert(exchange.id, exchange.clone());
        Ok(exchange)
    }

    fn find_exchange(&mut self, id: ExchangeId) -> Result<Option<StockExchange>> {
        Ok(self.state.exchanges.get(&id).cloned())
    }

    fn page_exchanges(
        &mut self,
        scope: ExchangeScope,
        request: &PageRequest<ExchangeSort>,
    ) -> Result<Page<StockExchange>> {
        let listings = &self.state.listings;
        let items: Vec<StockExchange> = self
            .state
            .exchanges
            .values()
            .filter(|exchange| match scope {
                ExchangeScope::All => true,
                ExchangeScope::Live => exchange.live_in_market,
                ExchangeScope::ListingStock(stock) => listings.contains_key(&(exchange.id, stock)),
            })
            .cloned()
            .collect();
        Ok(page_of(items, request, exchange_order(request.sort())))
    }

    fn update_exchange(&mut self, exchange: &StockExchange) -> Result<StockExchange> {
        let stored = self
            .state
            .exchanges
            .get_mut(&exchange.id)
            .ok_or_else(|| Error::not_found("stock exchange", exchange.id))?;
        if stored.version != exchange.version {
            return Err(Error::Conflict(format!(
                "stock exchange {} was modified concurrently",
                exchange.id
            )));
        }
        stored.name.clone_from(&exchange.name);
        stored.description.clone_from(&exchange.description);
        stored.live_in_market = exchange.live_in_market;
        stored.version += 1;
        Ok(stored.clone())
    }

    fn delete_exchange(&mut self, id: ExchangeId) -> Result<bool> {
        self.state.listings.retain(|(exchange, _), _| *exchange != id);
        Ok(self.state.exchanges.remove(&id).is_some())
    }

    fn insert_listing(
        &mut self,
        exchange: ExchangeId,
        stock: StockId,
        listed_at: DateTime<Utc>,
    ) -> Result<Listing> {
        if !self.state.exchanges.contains_key(&exchange) {
            return Err(Error::not_found("stock exchange", exchange));
        }
        if !self.state.stocks.contains_key(&stock) {
            return Err(Error::not_found("stock", stock));
        }
        if self.state.listings.contains_key(&(exchange, stock)) {
            return Err(Error::Duplicate(format!(
                "stock {stock} is already listed on stock exchange {exchange}"
            )));
        }
        self.state.listings.insert((exchange, stock), listed_at);
        Ok(Listing {
            exchange_id: exchange,
            stock_id: stock,
            listed_at,
        })
    }

    fn listing_exists(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool> {
        Ok(self.state.listings.contains_key(&(exchange, stock)))
    }

    fn delete_listing(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool> {
        Ok(self.state.listings.remove(&(exchange, stock)).is_some())
    }

    fn count_listings(&mut self, exchange: ExchangeId) -> Result<u64> {
        Ok(self
            .state
            .listings
            .keys()
            .filter(|(listed_on, _)| *listed_on == exchange)
            .count() as u64)
    }

    fn exchanges_listing(&mut self, stock: StockId) -> Result<Vec<ExchangeId>> {
        Ok(self
            .state
            .listings
            .keys()
            .filter(|(_, listed)| *listed == stock)
            .map(|(exchange, _)| *exchange)
            .collect())
    }

    fn delete_listings_of_stock(&mut self, stock: StockId) -> Result<usize> {
        let before = self.state.listings.len();
        self.state.listings.retain(|(_, listed), _| *listed != stock);
        Ok(before - self.state.listings.len())
    }

    fn count_users(&mut self) -> Result<u64> {
        Ok(self.state.users.len() as u64)
    }

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn insert_user(&mut self, user: &NewUser) -> Result<User> {
        if self.state.users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        self.state.last_user_id += 1;
        let mut authorities = user.authorities.clone();
        authorities.sort();
        authorities.dedup();
        let user = User {
            id: UserId::new(self.state.last_user_id),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            authorities,
            created_at: user.created_at,
            version: 0,
        };
        self.state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn failed_unit_of_work_leaves_state_untouched() {
        let store = MemoryStore::new();
        let result: Result<()> = store.transaction(|tx| {
            tx.insert_exchange(&NewExchange::try_new("NYSE", "New York")?)?;
            Err(Error::Conflict("abort".into()))
        });
        assert!(result.is_err());
        assert!(store
            .transaction(|tx| tx.find_exchange(ExchangeId::new(1)))
            .unwrap()
            .is_none());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store
            .transaction(|tx| tx.insert_stock(&NewStock::try_new("A", "a", dec!(1))?, Utc::now()))
            .unwrap();
        store.transaction(|tx| tx.delete_stock(first.id)).unwrap();
        let second = store
            .transaction(|tx| tx.insert_stock(&NewStock::try_new("B", "b", dec!(1))?, Utc::now()))
            .unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn name_sort_breaks_ties_by_id() {
        let store = MemoryStore::new();
        store
            .transaction(|tx| {
                for name in ["beta", "alpha", "beta"] {
                    tx.insert_exchange(&NewExchange::try_new(name, "venue")?)?;
                }
                Ok(())
            })
            .unwrap();

        let request = PageRequest::new(0, 10, ExchangeSort::Name).unwrap();
        let page = store
            .transaction(|tx| tx.page_exchanges(ExchangeScope::All, &request))
            .unwrap();
        let ids: Vec<i32> = page.items.iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn page_past_the_end_is_empty_with_total() {
        let store = MemoryStore::new();
        store
            .transaction(|tx| tx.insert_stock(&NewStock::try_new("A", "a", dec!(1))?, Utc::now()))
            .unwrap();

        let request = PageRequest::new(5, 10, StockSort::Id).unwrap();
        let page = store
            .transaction(|tx| tx.page_stocks(StockScope::All, &request))
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }
}
