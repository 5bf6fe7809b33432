//! Database error types
//!
//! This module classifies failures raised by SQLx so that the storage error
//! handed to callers carries a meaningful cause.

use thiserror::Error;

/// Errors that can occur during database operations
///
/// Repositories never return this type directly; it travels as the source of
/// `DataError::Storage`.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check or not-null constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The statement matched no row
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped back to its domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration could not be loaded or is invalid
    #[error("Invalid database configuration: {0}")]
    InvalidConfiguration(String),
}

impl DatabaseError {
    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Maps SQLx errors to DatabaseError variants by PostgreSQL error code
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("no rows returned".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::SerializationError(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                    Some("23503") => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                    Some("23502") | Some("23514") => {
                        DatabaseError::ConstraintViolation(db_err.message().to_string())
                    }
                    Some(code) if code.starts_with("08") => {
                        DatabaseError::ConnectionFailed(db_err.message().to_string())
                    }
                    Some(code) if code.starts_with("40") => {
                        DatabaseError::TransactionFailed(db_err.message().to_string())
                    }
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(&error)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_errors() {
        assert!(DatabaseError::from(&sqlx::Error::PoolTimedOut).is_connection_error());
        assert!(DatabaseError::from(sqlx::Error::PoolClosed).is_connection_error());
    }

    #[test]
    fn test_row_not_found() {
        let error = DatabaseError::from(&sqlx::Error::RowNotFound);
        assert!(matches!(error, DatabaseError::NotFound(_)));
        assert!(!error.is_constraint_violation());
    }

    #[test]
    fn test_constraint_classification() {
        assert!(DatabaseError::DuplicateEntry("items_pkey".into()).is_constraint_violation());
        assert!(DatabaseError::ForeignKeyViolation("items_department_id_fkey".into()).is_constraint_violation());
        assert!(!DatabaseError::QueryFailed("syntax".into()).is_constraint_violation());
    }
}
