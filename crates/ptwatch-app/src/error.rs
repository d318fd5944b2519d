//! Application-level error type for bootstrap and the CLI entrypoint.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error surfaced by bootstrap and the scheduler jobs.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error")]
    Config(#[from] ptwatch_config::ConfigError),
    /// Opening or migrating the database failed.
    #[error("storage error")]
    Store(#[from] ptwatch_store::StoreError),
}

impl AppError {
    /// Process exit code for this error, following the CLI convention that
    /// `0` is success and anything else is a distinct failure class.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Store(_) => 3,
        }
    }
}
