//! Builders for domain primitives used across tests.
//!
//! Factories panic on invalid input; they only ever see literals written
//! in tests.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::config;
use crate::adapter::outbound::memory::MemoryStore;
use crate::adapter::outbound::password::Argon2Hasher;
use crate::domain::exchange::{NewExchange, StockExchange};
use crate::domain::stock::{NewStock, Stock};
use crate::domain::user::Registration;
use crate::infrastructure::bootstrap::{build_hasher, Services};
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

/// Password used by [`registration`].
pub const PASSWORD: &str = "correct-horse-battery";

/// A valid stock creation request.
pub fn new_stock(name: &str, price: Decimal) -> NewStock {
    NewStock::try_new(name, format!("{name} Inc"), price).expect("valid stock")
}

/// A valid exchange creation request.
pub fn new_exchange(name: &str) -> NewExchange {
    NewExchange::try_new(name, format!("{name} exchange")).expect("valid exchange")
}

/// A valid registration with [`PASSWORD`].
pub fn registration(email: &str) -> Registration {
    Registration::try_new("Ada", "Lovelace", email, PASSWORD).expect("valid registration")
}

/// Fast Argon2 hasher.
pub fn hasher() -> Argon2Hasher {
    build_hasher(&config::password()).expect("valid argon2 params")
}

/// Services over a fresh in-memory store.
pub fn memory_services() -> Services<MemoryStore, Argon2Hasher> {
    services(Arc::new(MemoryStore::new()))
}

/// Services over `store` with the test secret and a fast hasher.
pub fn services<S: Store>(store: Arc<S>) -> Services<S, Argon2Hasher> {
    Services::new(store, hasher(), config::tokens()).expect("wire services")
}

/// Create `count` stocks named `S0`, `S1`, ... priced at their index.
pub fn seed_stocks<S: Store, H: PasswordHasher>(services: &Services<S, H>, count: usize) -> Vec<Stock> {
    (0..count)
        .map(|i| {
            services
                .stocks
                .create(&new_stock(&format!("S{i}"), Decimal::from(i)))
                .expect("create stock")
        })
        .collect()
}

/// Create an exchange and list every stock in `stocks` on it.
pub fn seed_exchange<S: Store, H: PasswordHasher>(
    services: &Services<S, H>,
    name: &str,
    stocks: &[Stock],
) -> StockExchange {
    let exchange = services
        .exchanges
        .create(&new_exchange(name))
        .expect("create exchange");
    for stock in stocks {
        services
            .listings
            .add(exchange.id, stock.id)
            .expect("add listing");
    }
    services.exchanges.get(exchange.id).expect("reload exchange")
}
