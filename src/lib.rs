//! Stockex - stock exchange catalog with listing accounting.
//!
//! Stocks are listed on stock exchanges; an exchange is live in the market
//! once it carries ten listings, and every listing change recomputes that
//! flag inside the same transaction. Users register and log in for HS256
//! tokens, and an access policy decides which operations each role may run.
//!
//! # Modules
//!
//! - [`domain`] - Entities, validated write requests, paging
//! - [`port`] - Store and password hasher traits
//! - [`application`] - Listing accounting, stock and exchange services,
//!   authentication, access policy
//! - [`adapter`] - SQLite and in-memory stores, Argon2 hashing, the CLI
//! - [`infrastructure`] - Configuration and service wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Fixtures for integration tests
//!
//! # Example
//!
//! ```no_run
//! use stockex::domain::exchange::NewExchange;
//! use stockex::infrastructure::bootstrap::bootstrap;
//! use stockex::infrastructure::config::settings::Config;
//!
//! fn main() -> stockex::error::Result<()> {
//!     let config = Config::load_or_default("stockex.toml")?;
//!     let services = bootstrap(&config)?;
//!     let exchange = services
//!         .exchanges
//!         .create(&NewExchange::try_new("NYSE", "New York")?)?;
//!     assert!(!exchange.live_in_market);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
