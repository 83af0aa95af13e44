use std::path::PathBuf;
use std::sync::Arc;

use diesel::prelude::*;
use stockex::adapter::outbound::password::Argon2Hasher;
use stockex::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use stockex::adapter::outbound::sqlite::SqliteStore;
use stockex::infrastructure::bootstrap::Services;
use stockex::testkit;
use tempfile::TempDir;

/// Temporary SQLite database for integration tests. Removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("stockex.db");
        let db = Self { dir, path };

        let pool = create_pool(db.url(), 1).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        // WAL mode improves concurrent writer behavior in tests.
        {
            let mut conn = pool.get().expect("get sqlite connection");
            diesel::sql_query("PRAGMA journal_mode=WAL")
                .execute(&mut conn)
                .expect("enable WAL mode");
        }

        db
    }

    pub fn url(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// A store with its own pool of `max_connections`.
    pub fn store(&self, max_connections: u32) -> SqliteStore {
        let pool = create_pool(self.url(), max_connections).expect("create sqlite pool");
        SqliteStore::new(pool)
    }

    pub fn services(&self) -> Services<SqliteStore, Argon2Hasher> {
        testkit::domain::services(Arc::new(self.store(4)))
    }
}
