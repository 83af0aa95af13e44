//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: storage and
//! password hashing.

pub mod credential;
pub mod store;
