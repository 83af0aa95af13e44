//! Database model types for Diesel ORM.
//!
//! Prices are stored as decimal strings and timestamps as RFC 3339 text, so
//! no precision is lost on the way through SQLite.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{listings, stock_exchanges, stocks, user_authorities, users};
use crate::error::{Error, Result};

/// Database row for a stock.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub current_price: String,
    pub updated_at: String,
    pub version: i32,
}

/// Database row for a stock (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stocks)]
pub struct NewStockRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub current_price: String,
    pub updated_at: String,
}

/// Database row for a stock exchange.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = stock_exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub live_in_market: bool,
    pub version: i32,
}

/// Database row for a stock exchange (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stock_exchanges)]
pub struct NewExchangeRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub live_in_market: bool,
}

/// Database row for a listing.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ListingRow {
    pub exchange_id: i32,
    pub stock_id: i32,
    pub listed_at: String,
}

/// Database row for a user.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub version: i32,
}

/// Database row for a user (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: String,
}

/// Database row for one authority held by a user.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = user_authorities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuthorityRow {
    pub user_id: i32,
    pub authority: String,
}

/// Render a timestamp the way every table stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// # Errors
/// Returns [`Error::Parse`] if the text is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}
