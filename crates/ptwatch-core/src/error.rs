//! Error types shared by torrent-client backends and their callers.

use std::error::Error;

use thiserror::Error;

/// Primary error type surfaced by `TorrentClient` implementations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend does not implement the requested capability.
    #[error("torrent client operation not supported")]
    Unsupported {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The backend RPC failed.
    #[error("torrent client operation failed")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A handle referenced by the caller no longer exists.
    #[error("torrent handle not found")]
    NotFound {
        /// Missing handle identifier.
        handle: String,
    },
    /// A newly added torrent could not be resolved by tag within the deadline.
    #[error("torrent handle unresolved after add")]
    HandleUnresolved {
        /// Tag that was polled for.
        tag: String,
    },
}

/// Convenience alias for torrent-client results.
pub type ClientResult<T> = Result<T, ClientError>;
