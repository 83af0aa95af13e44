//! SQLite persistence adapter.
//!
//! Provides the Diesel-backed [`store::SqliteStore`] together with the
//! connection pool, schema and row types it runs on.

pub mod database;
pub mod store;

pub use store::SqliteStore;
