//! SQLite catalog store implementation.
//!
//! Every unit of work runs inside an `IMMEDIATE` transaction, which takes
//! the database write lock up front. Two writers therefore never interleave
//! a listing count with a flag update.

use chrono::{DateTime, Utc};
use diesel::dsl::{exists, sql};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Double, Integer};
use diesel::sqlite::Sqlite;
use rust_decimal::Decimal;
use tracing::trace;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    format_timestamp, parse_timestamp, AuthorityRow, ExchangeRow, ListingRow, NewExchangeRow,
    NewStockRow, NewUserRow, StockRow, UserRow,
};
use crate::adapter::outbound::sqlite::database::schema::{
    listings, stock_exchanges, stocks, user_authorities, users,
};
use crate::domain::exchange::{NewExchange, StockExchange};
use crate::domain::id::{ExchangeId, StockId, UserId};
use crate::domain::listing::Listing;
use crate::domain::page::{ExchangeSort, Page, PageRequest, StockSort};
use crate::domain::stock::{NewStock, Stock};
use crate::domain::user::{Authority, NewUser, User};
use crate::error::{Error, Result};
use crate::port::outbound::store::{ExchangeScope, StockScope, Store, StoreTx};

/// SQLite-backed [`Store`].
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for SqliteStore {
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T>,
    {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            let mut tx = SqliteTx { conn };
            work(&mut tx)
        })
    }
}

/// One open transaction on a pooled connection.
struct SqliteTx<'a> {
    conn: &'a mut SqliteConnection,
}

impl SqliteTx<'_> {
    fn last_insert_id(&mut self) -> Result<i32> {
        Ok(diesel::select(sql::<Integer>("last_insert_rowid()")).get_result(self.conn)?)
    }

    fn stock_exists(&mut self, id: StockId) -> Result<bool> {
        Ok(diesel::select(exists(stocks::table.find(id.get()))).get_result(self.conn)?)
    }

    fn exchange_exists(&mut self, id: ExchangeId) -> Result<bool> {
        Ok(diesel::select(exists(stock_exchanges::table.find(id.get()))).get_result(self.conn)?)
    }

    fn authorities_of(&mut self, user: i32) -> Result<Vec<Authority>> {
        let labels: Vec<String> = user_authorities::table
            .filter(user_authorities::user_id.eq(user))
            .select(user_authorities::authority)
            .load(self.conn)?;

        let mut authorities = labels
            .iter()
            .map(|label| {
                label
                    .parse::<Authority>()
                    .map_err(|e| Error::Parse(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        authorities.sort();
        Ok(authorities)
    }
}

fn scoped_stocks(scope: StockScope) -> stocks::BoxedQuery<'static, Sqlite> {
    let query = stocks::table.into_boxed();
    match scope {
        StockScope::All => query,
        StockScope::OnExchange(exchange) => query.filter(
            stocks::id.eq_any(
                listings::table
                    .filter(listings::exchange_id.eq(exchange.get()))
                    .select(listings::stock_id),
            ),
        ),
    }
}

fn scoped_exchanges(scope: ExchangeScope) -> stock_exchanges::BoxedQuery<'static, Sqlite> {
    let query = stock_exchanges::table.into_boxed();
    match scope {
        ExchangeScope::All => query,
        ExchangeScope::Live => query.filter(stock_exchanges::live_in_market.eq(true)),
        ExchangeScope::ListingStock(stock) => query.filter(
            stock_exchanges::id.eq_any(
                listings::table
                    .filter(listings::stock_id.eq(stock.get()))
                    .select(listings::exchange_id),
            ),
        ),
    }
}

fn page_bounds<S: Copy>(request: &PageRequest<S>) -> Result<(i64, i64)> {
    let offset = i64::try_from(request.offset())
        .map_err(|_| Error::Parse(format!("page offset {} out of range", request.offset())))?;
    Ok((i64::from(request.size()), offset))
}

fn row_count(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|e| Error::Database(e.to_string()))
}

fn stock_from_row(row: StockRow) -> Result<Stock> {
    let current_price: Decimal = row
        .current_price
        .parse()
        .map_err(|e: rust_decimal::Error| Error::Parse(e.to_string()))?;
    Ok(Stock {
        id: StockId::new(row.id),
        name: row.name,
        description: row.description,
        current_price,
        updated_at: parse_timestamp(&row.updated_at)?,
        version: row.version,
    })
}

fn exchange_from_row(row: ExchangeRow) -> StockExchange {
    StockExchange {
        id: ExchangeId::new(row.id),
        name: row.name,
        description: row.description,
        live_in_market: row.live_in_market,
        version: row.version,
    }
}

/// Map a write failure, turning unique-constraint hits into `on_unique`.
fn write_error(err: DieselError, on_unique: impl FnOnce() -> Error) -> Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => on_unique(),
        other => Error::Database(other.to_string()),
    }
}

impl StoreTx for SqliteTx<'_> {
    fn insert_stock(&mut self, stock: &NewStock, updated_at: DateTime<Utc>) -> Result<Stock> {
        let row = NewStockRow {
            name: stock.name(),
            description: stock.description(),
            current_price: stock.current_price().to_string(),
            updated_at: format_timestamp(updated_at),
        };
        diesel::insert_into(stocks::table)
            .values(&row)
            .execute(self.conn)?;

        let id = StockId::new(self.last_insert_id()?);
        trace!(stock_id = %id, "Inserted stock row");
        self.find_stock(id)?
            .ok_or_else(|| Error::Database(format!("stock {id} missing after insert")))
    }

    fn find_stock(&mut self, id: StockId) -> Result<Option<Stock>> {
        let row: Option<StockRow> = stocks::table
            .find(id.get())
            .select(StockRow::as_select())
            .first(self.conn)
            .optional()?;

        row.map(stock_from_row).transpose()
    }

    fn page_stocks(&mut self, scope: StockScope, request: &PageRequest<StockSort>) -> Result<Page<Stock>> {
        let total: i64 = scoped_stocks(scope).count().get_result(self.conn)?;
        let (limit, offset) = page_bounds(request)?;

        let query = scoped_stocks(scope);
        let query = match request.sort() {
            StockSort::Id => query.order(stocks::id.asc()),
            StockSort::Name => query.order((stocks::name.asc(), stocks::id.asc())),
            StockSort::Price => query.order((
                sql::<Double>("CAST(current_price AS REAL)").asc(),
                stocks::id.asc(),
            )),
            StockSort::UpdatedAt => query.order((stocks::updated_at.asc(), stocks::id.asc())),
        };
        let rows: Vec<StockRow> = query
            .select(StockRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(self.conn)?;

        let items = rows
            .into_iter()
            .map(stock_from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(request.respond(items, row_count(total)?))
    }

    fn count_stocks(&mut self) -> Result<u64> {
        let total: i64 = stocks::table.count().get_result(self.conn)?;
        row_count(total)
    }

    fn update_stock(&mut self, stock: &Stock) -> Result<Stock> {
        let updated = diesel::update(
            stocks::table
                .filter(stocks::id.eq(stock.id.get()))
                .filter(stocks::version.eq(stock.version)),
        )
        .set((
            stocks::current_price.eq(stock.current_price.to_string()),
            stocks::updated_at.eq(format_timestamp(stock.updated_at)),
            stocks::version.eq(stock.version + 1),
        ))
        .execute(self.conn)?;

        if updated == 0 {
            return Err(if self.stock_exists(stock.id)? {
                Error::Conflict(format!("stock {} was modified concurrently", stock.id))
            } else {
                Error::not_found("stock", stock.id)
            });
        }
        self.find_stock(stock.id)?
            .ok_or_else(|| Error::not_found("stock", stock.id))
    }

    fn delete_stock(&mut self, id: StockId) -> Result<bool> {
        let deleted = diesel::delete(stocks::table.find(id.get())).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn insert_exchange(&mut self, exchange: &NewExchange) -> Result<StockExchange> {
        diesel::insert_into(stock_exchanges::table)
            .values(&NewExchangeRow {
                name: exchange.name(),
                description: exchange.description(),
                live_in_market: false,
            })
            .execute(self.conn)?;

        let id = ExchangeId::new(self.last_insert_id()?);
        trace!(exchange_id = %id, "Inserted stock exchange row");
        self.find_exchange(id)?
            .ok_or_else(|| Error::Database(format!("stock exchange {id} missing after insert")))
    }

    fn find_exchange(&mut self, id: ExchangeId) -> Result<Option<StockExchange>> {
        let row: Option<ExchangeRow> = stock_exchanges::table
            .find(id.get())
            .select(ExchangeRow::as_select())
            .first(self.conn)
            .optional()?;

        Ok(row.map(exchange_from_row))
    }

    fn page_exchanges(
        &mut self,
        scope: ExchangeScope,
        request: &PageRequest<ExchangeSort>,
    ) -> Result<Page<StockExchange>> {
        let total: i64 = scoped_exchanges(scope).count().get_result(self.conn)?;
        let (limit, offset) = page_bounds(request)?;

        let query = scoped_exchanges(scope);
        let query = match request.sort() {
            ExchangeSort::Id => query.order(stock_exchanges::id.asc()),
            ExchangeSort::Name => {
                query.order((stock_exchanges::name.asc(), stock_exchanges::id.asc()))
            }
        };
        let rows: Vec<ExchangeRow> = query
            .select(ExchangeRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(self.conn)?;

        let items = rows.into_iter().map(exchange_from_row).collect();
        Ok(request.respond(items, row_count(total)?))
    }

    fn update_exchange(&mut self, exchange: &StockExchange) -> Result<StockExchange> {
        let updated = diesel::update(
            stock_exchanges::table
                .filter(stock_exchanges::id.eq(exchange.id.get()))
                .filter(stock_exchanges::version.eq(exchange.version)),
        )
        .set((
            stock_exchanges::name.eq(&exchange.name),
            stock_exchanges::description.eq(&exchange.description),
            stock_exchanges::live_in_market.eq(exchange.live_in_market),
            stock_exchanges::version.eq(exchange.version + 1),
        ))
        .execute(self.conn)?;

        if updated == 0 {
            return Err(if self.exchange_exists(exchange.id)? {
                Error::Conflict(format!(
                    "stock exchange {} was modified concurrently",
                    exchange.id
                ))
            } else {
                Error::not_found("stock exchange", exchange.id)
            });
        }
        self.find_exchange(exchange.id)?
            .ok_or_else(|| Error::not_found("stock exchange", exchange.id))
    }

    fn delete_exchange(&mut self, id: ExchangeId) -> Result<bool> {
        diesel::delete(listings::table.filter(listings::exchange_id.eq(id.get())))
            .execute(self.conn)?;
        let deleted = diesel::delete(stock_exchanges::table.find(id.get())).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn insert_listing(
        &mut self,
        exchange: ExchangeId,
        stock: StockId,
        listed_at: DateTime<Utc>,
    ) -> Result<Listing> {
        let row = ListingRow {
            exchange_id: exchange.get(),
            stock_id: stock.get(),
            listed_at: format_timestamp(listed_at),
        };
        diesel::insert_into(listings::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|e| {
                write_error(e, || {
                    Error::Duplicate(format!(
                        "stock {stock} is already listed on stock exchange {exchange}"
                    ))
                })
            })?;

        Ok(Listing {
            exchange_id: exchange,
            stock_id: stock,
            listed_at: parse_timestamp(&row.listed_at)?,
        })
    }

    fn listing_exists(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool> {
        Ok(
            diesel::select(exists(listings::table.find((exchange.get(), stock.get()))))
                .get_result(self.conn)?,
        )
    }

    fn delete_listing(&mut self, exchange: ExchangeId, stock: StockId) -> Result<bool> {
        let deleted = diesel::delete(listings::table.find((exchange.get(), stock.get())))
            .execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn count_listings(&mut self, exchange: ExchangeId) -> Result<u64> {
        let total: i64 = listings::table
            .filter(listings::exchange_id.eq(exchange.get()))
            .count()
            .get_result(self.conn)?;
        row_count(total)
    }

    fn exchanges_listing(&mut self, stock: StockId) -> Result<Vec<ExchangeId>> {
        let ids: Vec<i32> = listings::table
            .filter(listings::stock_id.eq(stock.get()))
            .select(listings::exchange_id)
            .order(listings::exchange_id.asc())
            .load(self.conn)?;
        Ok(ids.into_iter().map(ExchangeId::new).collect())
    }

    fn delete_listings_of_stock(&mut self, stock: StockId) -> Result<usize> {
        Ok(diesel::delete(listings::table.filter(listings::stock_id.eq(stock.get())))
            .execute(self.conn)?)
    }

    fn count_users(&mut self) -> Result<u64> {
        let total: i64 = users::table.count().get_result(self.conn)?;
        row_count(total)
    }

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(self.conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let authorities = self.authorities_of(row.id)?;
        Ok(Some(User {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            authorities,
            created_at: parse_timestamp(&row.created_at)?,
            version: row.version,
        }))
    }

    fn insert_user(&mut self, user: &NewUser) -> Result<User> {
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                first_name: &user.first_name,
                last_name: &user.last_name,
                email: &user.email,
                password_hash: &user.password_hash,
                created_at: format_timestamp(user.created_at),
            })
            .execute(self.conn)
            .map_err(|e| {
                write_error(e, || {
                    Error::Conflict(format!("email {} is already registered", user.email))
                })
            })?;

        let id = self.last_insert_id()?;
        let rows: Vec<AuthorityRow> = user
            .authorities
            .iter()
            .map(|authority| AuthorityRow {
                user_id: id,
                authority: authority.as_str().to_string(),
            })
            .collect();
        diesel::insert_into(user_authorities::table)
            .values(&rows)
            .execute(self.conn)?;

        self.find_user_by_email(&user.email)?
            .ok_or_else(|| Error::Database(format!("user {id} missing after insert")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn setup_store() -> SqliteStore {
        let pool = create_pool(":memory:", 1).unwrap();
        run_migrations(&pool).unwrap();
        SqliteStore::new(pool)
    }

    fn seed_stocks(store: &SqliteStore, prices: &[Decimal]) -> Vec<StockId> {
        store
            .transaction(|tx| {
                prices
                    .iter()
                    .enumerate()
                    .map(|(i, price)| -> Result<StockId> {
                        let stock = NewStock::try_new(format!("S{i}"), "stock", *price)?;
                        Ok(tx.insert_stock(&stock, Utc::now())?.id)
                    })
                    .collect()
            })
            .unwrap()
    }

    fn seed_exchange(store: &SqliteStore, name: &str) -> ExchangeId {
        store
            .transaction(|tx| Ok(tx.insert_exchange(&NewExchange::try_new(name, "exchange")?)?.id))
            .unwrap()
    }

    #[test]
    fn insert_and_find_stock_preserves_decimal() {
        let store = setup_store();
        let ids = seed_stocks(&store, &[dec!(12.3400)]);

        let stock = store
            .transaction(|tx| tx.find_stock(ids[0]))
            .unwrap()
            .unwrap();
        assert_eq!(stock.current_price, dec!(12.3400));
        assert_eq!(stock.current_price.to_string(), "12.3400");
        assert_eq!(stock.version, 0);
    }

    #[test]
    fn failed_unit_of_work_rolls_back() {
        let store = setup_store();
        let result: Result<()> = store.transaction(|tx| {
            tx.insert_exchange(&NewExchange::try_new("LSE", "London")?)?;
            Err(Error::Conflict("abort".into()))
        });
        assert!(result.is_err());

        let page = store
            .transaction(|tx| tx.page_exchanges(ExchangeScope::All, &PageRequest::first(10)?))
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let store = setup_store();
        let ids = seed_stocks(&store, &[dec!(1)]);

        let err = store
            .transaction(|tx| {
                let mut stock = tx.find_stock(ids[0])?.unwrap();
                stock.current_price = dec!(2);
                tx.update_stock(&stock)?;
                stock.current_price = dec!(3);
                tx.update_stock(&stock)
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn price_sort_is_numeric_not_lexical() {
        let store = setup_store();
        seed_stocks(&store, &[dec!(100), dec!(9.5), dec!(20)]);

        let request = PageRequest::new(0, 10, StockSort::Price).unwrap();
        let page = store
            .transaction(|tx| tx.page_stocks(StockScope::All, &request))
            .unwrap();
        let prices: Vec<Decimal> = page.items.iter().map(|s| s.current_price).collect();
        assert_eq!(prices, vec![dec!(9.5), dec!(20), dec!(100)]);
    }

    #[test]
    fn scoped_pages_follow_listings() {
        let store = setup_store();
        let stocks = seed_stocks(&store, &[dec!(1), dec!(2), dec!(3)]);
        let nyse = seed_exchange(&store, "NYSE");
        let lse = seed_exchange(&store, "LSE");

        store
            .transaction(|tx| {
                tx.insert_listing(nyse, stocks[0], Utc::now())?;
                tx.insert_listing(nyse, stocks[2], Utc::now())?;
                tx.insert_listing(lse, stocks[2], Utc::now())?;
                Ok(())
            })
            .unwrap();

        let request = PageRequest::first(10).unwrap();
        let on_nyse = store
            .transaction(|tx| tx.page_stocks(StockScope::OnExchange(nyse), &request))
            .unwrap();
        assert_eq!(on_nyse.total, 2);
        assert_eq!(
            on_nyse.items.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![stocks[0], stocks[2]]
        );

        let exchange_request = PageRequest::<ExchangeSort>::first(10).unwrap();
        let listing_third = store
            .transaction(|tx| {
                tx.page_exchanges(ExchangeScope::ListingStock(stocks[2]), &exchange_request)
            })
            .unwrap();
        assert_eq!(listing_third.total, 2);

        let ids = store
            .transaction(|tx| tx.exchanges_listing(stocks[2]))
            .unwrap();
        assert_eq!(ids, vec![nyse, lse]);
    }

    #[test]
    fn duplicate_listing_maps_to_duplicate() {
        let store = setup_store();
        let stocks = seed_stocks(&store, &[dec!(1)]);
        let nyse = seed_exchange(&store, "NYSE");

        store
            .transaction(|tx| tx.insert_listing(nyse, stocks[0], Utc::now()))
            .unwrap();
        let err = store
            .transaction(|tx| tx.insert_listing(nyse, stocks[0], Utc::now()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }

    #[test]
    fn deleting_exchange_removes_its_listings() {
        let store = setup_store();
        let stocks = seed_stocks(&store, &[dec!(1)]);
        let nyse = seed_exchange(&store, "NYSE");
        store
            .transaction(|tx| tx.insert_listing(nyse, stocks[0], Utc::now()))
            .unwrap();

        assert!(store.transaction(|tx| tx.delete_exchange(nyse)).unwrap());
        assert!(store
            .transaction(|tx| tx.exchanges_listing(stocks[0]))
            .unwrap()
            .is_empty());
        assert!(!store.transaction(|tx| tx.delete_exchange(nyse)).unwrap());
    }

    #[test]
    fn users_roundtrip_with_authorities() {
        let store = setup_store();
        let new_user = NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            authorities: vec![Authority::Admin, Authority::User],
            created_at: Utc::now(),
        };

        let user = store.transaction(|tx| tx.insert_user(&new_user)).unwrap();
        assert_eq!(user.authorities, vec![Authority::User, Authority::Admin]);
        assert_eq!(store.transaction(|tx| tx.count_users()).unwrap(), 1);

        let err = store
            .transaction(|tx| tx.insert_user(&new_user))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let missing = store
            .transaction(|tx| tx.find_user_by_email("nobody@example.com"))
            .unwrap();
        assert!(missing.is_none());
    }
}
