pub mod models;
pub mod photos;
pub mod users;
pub mod words;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(db_err.message().to_string());
            }
        }
        match err {
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                DatabaseError::ConnectionError(e.to_string())
            }
            e => DatabaseError::Sqlx(e),
        }
    }
}

impl DatabaseError {
    /// True when the error came from losing a race at a unique index.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Connect to Postgres and bootstrap the schema. Fatal on failure: the
/// process must not serve traffic without a reachable database.
pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    // Liveness probe before anything else touches the pool
    sqlx::query("SELECT 1").execute(&pool).await?;

    ensure_schema(&pool).await?;
    info!("Database pool ready, schema ensured");
    Ok(pool)
}

/// Create tables if they don't exist yet. Uniqueness of usernames, object
/// keys, and word text is owned by these indexes, not by application locks;
/// concurrent writers race at the index and exactly one wins.
async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id              uuid PRIMARY KEY DEFAULT gen_random_uuid(),
            username        text NOT NULL UNIQUE,
            password_hash   text NOT NULL,
            email           text UNIQUE,
            is_admin        boolean NOT NULL DEFAULT false,
            is_active       boolean NOT NULL DEFAULT true
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photos (
            id              uuid PRIMARY KEY DEFAULT gen_random_uuid(),
            object_key      text NOT NULL UNIQUE,
            uploaded_at     timestamptz NOT NULL DEFAULT now(),
            owner_id        uuid NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            id              uuid PRIMARY KEY DEFAULT gen_random_uuid(),
            text            varchar(64) NOT NULL UNIQUE,
            created_at      timestamptz NOT NULL DEFAULT now(),
            creator_id      uuid NOT NULL REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
