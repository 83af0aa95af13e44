//! Application services (use cases).
//!
//! Each service runs its reads and writes through a single
//! [`Store::transaction`](crate::port::outbound::store::Store::transaction)
//! so a failed operation leaves nothing behind.

pub mod access;
pub mod auth;
pub mod exchange;
pub mod listing;
pub mod stock;
mod version;

pub use access::{authorize, Operation};
pub use auth::AuthService;
pub use exchange::ExchangeService;
pub use listing::{recompute_live_status, ListingService};
pub use stock::StockService;
