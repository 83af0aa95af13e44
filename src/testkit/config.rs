//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use chrono::Duration;

use crate::application::auth::TokenSettings;
use crate::infrastructure::config::auth::{PasswordConfig, SigningSecret};
use crate::infrastructure::config::settings::Config;

/// Signing secret accepted by config validation.
pub const TEST_SECRET: &str = "stockex-test-secret-0123456789abcdef";

/// Smallest Argon2 cost argon2 accepts. Hashing takes microseconds.
pub fn password() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

/// Token settings with the default lifetimes.
pub fn tokens() -> TokenSettings {
    TokenSettings {
        secret: TEST_SECRET.as_bytes().to_vec(),
        access_ttl: Duration::minutes(15),
        refresh_ttl: Duration::days(7),
    }
}

/// Full configuration for the database at `url`, with the test secret.
pub fn config(url: &str) -> Config {
    let mut config = Config::default();
    config.database.url = url.to_string();
    config.auth.password = password();
    config.auth.jwt_secret = Some(SigningSecret::new(TEST_SECRET));
    config
}

/// TOML equivalent of [`config`], for tests that go through a file.
pub fn config_toml(url: &str) -> String {
    format!(
        "[database]\nurl = {url:?}\n\n[auth.password]\nmemory_kib = 8\niterations = 1\nparallelism = 1\n"
    )
}
