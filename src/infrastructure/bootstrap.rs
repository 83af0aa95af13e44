//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::password::Argon2Hasher;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::application::auth::TokenSettings;
use crate::application::{AuthService, ExchangeService, ListingService, StockService};
use crate::error::Result;
use crate::infrastructure::config::auth::PasswordConfig;
use crate::infrastructure::config::database::DatabaseConfig;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

/// Every service, sharing one store.
pub struct Services<S, H> {
    pub stocks: StockService<S>,
    pub exchanges: ExchangeService<S>,
    pub listings: ListingService<S>,
    pub auth: AuthService<S, H>,
}

impl<S: Store, H: PasswordHasher> Services<S, H> {
    /// Wire the services around `store`.
    ///
    /// # Errors
    /// Returns an error if the auth service cannot hash its decoy password.
    pub fn new(store: Arc<S>, hasher: H, tokens: TokenSettings) -> Result<Self> {
        Ok(Self {
            stocks: StockService::new(Arc::clone(&store)),
            exchanges: ExchangeService::new(Arc::clone(&store)),
            listings: ListingService::new(Arc::clone(&store)),
            auth: AuthService::new(store, hasher, tokens)?,
        })
    }
}

/// Open the database, apply pending migrations and wrap it in a store.
///
/// # Errors
/// Returns an error if the pool cannot be built or a migration fails.
pub fn open_store(config: &DatabaseConfig) -> Result<SqliteStore> {
    let pool = create_pool(&config.url, config.max_connections)?;
    run_migrations(&pool)?;
    info!(url = %config.url, "Database ready");
    Ok(SqliteStore::new(pool))
}

/// Build the password hasher from configured cost parameters.
///
/// # Errors
/// Returns [`crate::error::Error::Hashing`] for parameters argon2 rejects.
pub fn build_hasher(config: &PasswordConfig) -> Result<Argon2Hasher> {
    Argon2Hasher::new(config.memory_kib, config.iterations, config.parallelism)
}

/// Build every service against the configured SQLite database.
///
/// # Errors
/// Returns an error if the signing secret is missing, the database cannot
/// be opened or migrated, or the hashing parameters are rejected.
pub fn bootstrap(config: &Config) -> Result<Services<SqliteStore, Argon2Hasher>> {
    let tokens = config.auth.token_settings()?;
    let store = Arc::new(open_store(&config.database)?);
    let hasher = build_hasher(&config.auth.password)?;
    Services::new(store, hasher, tokens)
}
