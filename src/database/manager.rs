use sqlx::error::ErrorKind;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::PasswordError;
use crate::config::DatabaseConfig;
use crate::database::partial_update::UpdateError;
use crate::filter::FilterError;

/// Errors raised by the storage layer and the resource services built on it.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidData(String),

    #[error(transparent)]
    InvalidUpdate(#[from] UpdateError),

    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Turns constraint violations from a single-statement write into domain
    /// errors; everything else stays a raw storage error.
    pub fn from_constraint(
        err: sqlx::Error,
        on_unique: impl FnOnce() -> DatabaseError,
        on_foreign_key: impl FnOnce(Option<&str>) -> DatabaseError,
    ) -> DatabaseError {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => return on_unique(),
                ErrorKind::ForeignKeyViolation => return on_foreign_key(db_err.constraint()),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds and checks the shared connection pool.
pub struct DatabaseManager;

impl DatabaseManager {
    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Connects eagerly; fails fast if the database is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Defers connecting until the first query, so the API can start while
    /// the database is still coming up.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect_lazy(&config.url)?;
        info!("Created lazy database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_pass_through() {
        let err = DatabaseError::from_constraint(
            sqlx::Error::RowNotFound,
            || DatabaseError::Duplicate("dup".into()),
            |_| DatabaseError::NotFound("missing".into()),
        );
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn messages() {
        assert_eq!(DatabaseError::InvalidCredentials.to_string(), "Invalid username/password");
        assert_eq!(
            DatabaseError::Duplicate("Duplicate company: c1".into()).to_string(),
            "Duplicate company: c1"
        );
        assert_eq!(
            DatabaseError::from(FilterError::NegativeBound("minSalary".into())).to_string(),
            "minSalary must be >= 0"
        );
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let config = DatabaseConfig {
            url: "postgres://127.0.0.1:1/unreachable".to_string(),
            max_connections: 1,
            connection_timeout: 1,
        };
        assert!(DatabaseManager::connect_lazy(&config).is_ok());
    }
}
