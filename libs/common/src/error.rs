//! Errors of the shared PostgreSQL layer
//!
//! Each variant names the stage that failed: building the pool, running the
//! health check query, applying the schema script, or reading `DATABASE_*` settings.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failure while setting up or checking the database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not connect or open a transaction
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// The health check query failed
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A statement of the schema script failed; the script is rolled back
    #[error("Database schema error: {0}")]
    Schema(#[source] SqlxError),

    /// `DATABASE_*` environment variables are unusable
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_name_the_problem() {
        let err = DatabaseError::Configuration("DATABASE_URL must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Database configuration error: DATABASE_URL must not be empty"
        );
    }

    #[test]
    fn sqlx_failures_keep_their_source() {
        use std::error::Error as _;

        let err = DatabaseError::Schema(SqlxError::PoolClosed);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Database schema error:"));
    }
}
