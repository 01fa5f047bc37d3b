//! PostgreSQL pool for the entry store

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::entries::{PgEntryStore, schema};

/// Pool ceiling. Entry queries are short single-row statements.
pub const MAX_CONNECTIONS: u32 = 20;
/// How long a request waits for a free connection before failing.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open the pool and make sure the `entries` table exists.
    pub async fn open(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections = MAX_CONNECTIONS, "[DB] pool established");

        schema::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Entry store sharing this pool.
    pub fn entry_store(&self) -> PgEntryStore {
        PgEntryStore::new(self.pool.clone())
    }
}
