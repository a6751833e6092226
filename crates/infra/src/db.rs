//! Postgres connection wiring and schema bootstrap.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | Decode / ColumnDecode | N/A | `Corrupt` |
//! | Anything else (pool closed, IO, TLS) | N/A | `Unavailable` |

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use fixit_core::StoreError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NULL,
        created_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS issues (
        id           UUID PRIMARY KEY,
        title        TEXT NOT NULL,
        description  TEXT NOT NULL,
        region       TEXT NOT NULL,
        gps_location TEXT NOT NULL,
        category     TEXT NOT NULL,
        flyer_url    TEXT NOT NULL,
        owner_id     UUID NOT NULL REFERENCES users (id),
        status       TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL,
        UNIQUE (owner_id, title)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS issues_created_at_idx ON issues (created_at)",
];

/// Open the process-wide pool. Called once at startup.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::corrupt(format!("decode error in {}: {}", operation, err))
        }
        _ => StoreError::unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
