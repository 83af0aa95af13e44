//! Database connection settings.

use serde::Deserialize;

/// SQLite database settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite path or URL. `:memory:` opens a private in-memory database.
    pub url: String,
    /// Upper bound on pooled connections. Ignored for `:memory:`.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "stockex.db".into(),
            max_connections: 4,
        }
    }
}
