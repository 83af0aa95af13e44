//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - the command-line request boundary
//! - [`outbound`] - SQLite and in-memory stores, password hashing

pub mod inbound;
pub mod outbound;
