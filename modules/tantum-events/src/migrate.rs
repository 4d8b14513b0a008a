use sqlx::PgPool;
use tracing::{error, info};

/// Postgres SQLSTATE for `duplicate_table`.
const DUPLICATE_TABLE: &str = "42P07";

const CREATE_EVENT_USERS: &str = r#"
    CREATE TABLE event_users (
        id      SERIAL    PRIMARY KEY,
        time    TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        user_id TEXT      NOT NULL,
        data    TEXT      NOT NULL
    )
"#;

/// Result of [`ensure_schema`]. None of these stop startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOutcome {
    Created,
    AlreadyExists,
    /// Any other failure. Inserts will fail later and be logged per event.
    Failed(String),
}

/// Create the `event_users` table. Safe to run on every start.
pub async fn ensure_schema(pool: &PgPool) -> SchemaOutcome {
    match sqlx::query(CREATE_EVENT_USERS).execute(pool).await {
        Ok(_) => {
            info!("Table create successful");
            SchemaOutcome::Created
        }
        Err(e) if is_duplicate_table(&e) => {
            info!("Table already exists");
            SchemaOutcome::AlreadyExists
        }
        Err(e) => {
            error!(error = %e, "Failed to create event_users table");
            SchemaOutcome::Failed(e.to_string())
        }
    }
}

fn is_duplicate_table(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(DUPLICATE_TABLE),
        _ => false,
    }
}
