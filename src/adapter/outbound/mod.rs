//! Outbound adapters (driven side).

pub mod memory;
pub mod password;
pub mod sqlite;
