use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::schema;

/// Errors from the data-access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multi-row change was rolled back; the store is unchanged.
    #[error("Integrity failure: {0}")]
    IntegrityFailure(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classifies a failed write: unique violations become `Conflict`,
    /// foreign-key violations become `NotFound` on the missing parent.
    pub fn from_write(err: sqlx::Error, entity: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(format!(
                    "{} violates unique constraint {}",
                    entity,
                    db_err.constraint().unwrap_or("(unnamed)")
                ));
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::NotFound(format!(
                    "{} references a missing row ({})",
                    entity,
                    db_err.constraint().unwrap_or("foreign key")
                ));
            }
        }
        DatabaseError::Sqlx(err)
    }

    /// Classifies a failed delete: a row that is still referenced is a `Conflict`,
    /// anything else aborted the cascade and is an `IntegrityFailure`.
    pub fn from_delete(err: sqlx::Error, entity: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::Conflict(format!("{} is still referenced", entity));
            }
        }
        DatabaseError::IntegrityFailure(format!("deleting {} failed: {}", entity, err))
    }
}

/// Owns the Postgres connection pool for the process.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect using `database.url` from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let redacted = Self::redacted_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", redacted);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Connection string safe to log: the password is masked.
    fn redacted_url(url: &str) -> Result<String, DatabaseError> {
        let mut parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if parsed.password().is_some() {
            parsed
                .set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(parsed.into())
    }
}
