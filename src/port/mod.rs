//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! Application services are written against these traits; adapters under
//! [`crate::adapter`] implement them.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  CLI    │            │   Store     │              │ Password  │
//! │ Adapter │            │   Adapter   │              │  Hasher   │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Store`] / [`StoreTx`] - Unit-of-work persistence for the catalog and users
//! - [`PasswordHasher`] - One-way password hashing

pub mod outbound;

pub use outbound::credential::PasswordHasher;
pub use outbound::store::{ExchangeScope, StockScope, Store, StoreTx};
