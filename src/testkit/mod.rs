//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`config`] - Canonical test configurations: a signing secret, cheap
//!   Argon2 parameters, a [`Config`](crate::infrastructure::config::settings::Config)
//!   pointing at a given database.
//! - [`domain`] - Builders for stocks, exchanges and registrations, plus
//!   in-memory service wiring.

pub mod config;
pub mod domain;
