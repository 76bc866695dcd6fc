//! Error types for schema initialization and record access

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type used across the database layer
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while declaring, creating, or accessing the dashboard schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The database cannot be reached or the principal cannot write to it
    #[error("Connection error: {0}")]
    Connection(String),

    /// A pre-existing table is incompatible with the declared structure
    #[error("Schema conflict on table '{table}': {detail}")]
    Conflict { table: String, detail: String },

    /// A row was rejected by a column-level constraint
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A record type cannot be bound to its table
    #[error("Cannot bind {record} to '{table}': {detail}")]
    Binding {
        record: &'static str,
        table: String,
        detail: String,
    },

    /// A record type was used before it was bound
    #[error("Record type {0} is not bound to any table")]
    Unbound(&'static str),

    /// The registry holds no table with that name
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The registry already holds a different definition under the same name
    #[error("Registry error: {0}")]
    Registry(String),

    /// An injected vocabulary cannot back an enumerated column
    #[error("Invalid vocabulary for '{column}': {detail}")]
    Vocabulary { column: String, detail: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl SchemaError {
    /// Create a structural conflict error.
    pub fn conflict(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Conflict {
            table: table.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error comes from an unreachable or read-only database
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether this error is a rejected write
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure,
            ) => Self::Connection(err.to_string()),
            Some(ErrorCode::ConstraintViolation) => Self::Constraint(err.to_string()),
            _ => Self::Database(err),
        }
    }
}
