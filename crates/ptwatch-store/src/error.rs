//! Error types for the persistence layer.

use thiserror::Error;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Migration execution failed.
    #[error("failed to run database migrations")]
    Migration(#[source] sqlx::migrate::MigrateError),
    /// A query failed.
    #[error("database operation {operation} failed")]
    Query {
        /// Operation identifier, for diagnostics.
        operation: &'static str,
        /// Underlying SQL error.
        #[source]
        source: sqlx::Error,
    },
    /// A persisted row's `kind`/`state` discriminator held an unrecognised value.
    #[error("row in {table} held an unrecognised discriminator: {value}")]
    UnrecognisedDiscriminator {
        /// Table the row came from.
        table: &'static str,
        /// The unrecognised value.
        value: String,
    },
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
