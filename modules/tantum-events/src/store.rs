//! Postgres writes for accepted events (`event_users` table).

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgPool};
use tantum_common::{Config, IngestError};
use tracing::info;

use crate::types::PersistedEventRecord;

/// Destination for processed events. Workers only see this trait.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Write one row. Returns the storage-assigned id.
    async fn insert(&self, user_id: &str, data: &str) -> Result<i32, IngestError>;
}

/// Postgres-backed event sink. Cheap to clone; all clones share the pool.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run a liveness check. Any failure here is fatal for startup.
    pub async fn connect(config: &Config) -> Result<Self, IngestError> {
        info!(
            host = %config.db_host,
            port = config.db_port,
            database = %config.db_name,
            "Connection to database"
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_count.max(1) as u32)
            .acquire_timeout(config.db_acquire_timeout)
            .connect_with(connect_options(config))
            .await
            .map_err(|e| IngestError::Startup(format!("connect to database: {e}")))?;

        let store = Self::new(pool);
        store.ping().await?;
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), IngestError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| IngestError::Startup(format!("acquire connection: {e}")))?;
        conn.ping()
            .await
            .map_err(|e| IngestError::Startup(format!("ping database: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Most recent rows first.
    pub async fn read_recent(&self, limit: i64) -> Result<Vec<PersistedEventRecord>, IngestError> {
        sqlx::query_as::<_, PersistedEventRecord>(
            r#"
            SELECT id, time, user_id, data
            FROM event_users
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| IngestError::Persistence(e.to_string()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Credentials are passed as fields, never spliced into a URL, so reserved
/// characters in the user or password need no escaping.
pub fn connect_options(config: &Config) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(&config.db_password)
        .database(&config.db_name)
        .ssl_mode(PgSslMode::Disable)
}

#[async_trait]
impl EventSink for EventStore {
    async fn insert(&self, user_id: &str, data: &str) -> Result<i32, IngestError> {
        let row = sqlx::query_as::<_, (i32,)>(
            "INSERT INTO event_users (user_id, data) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| IngestError::Persistence(e.to_string()))?;

        Ok(row.0)
    }
}
