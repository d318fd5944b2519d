//! Sweeps completed, tagged torrents out to external storage.

use async_trait::async_trait;
use ptwatch_core::{ClientResult, TorrentClient};
use tracing::warn;

/// Moves a completed torrent's payload to its final destination.
///
/// Out of scope for this crate to implement; `ptwatch-app` wires a concrete
/// adapter (e.g. a filesystem move or a remote copy) at the boundary.
#[async_trait]
pub trait ExternalTransfer: Send + Sync {
    /// Attempt to transfer the payload at `path`. Returns whether it succeeded.
    async fn transfer(&self, path: &str) -> bool;
}

/// Scheduled job that drains completed torrents to external storage.
pub struct TransferWorker<'a, C: TorrentClient, T: ExternalTransfer> {
    client: &'a C,
    transfer: &'a T,
    tag: Option<String>,
}

impl<'a, C: TorrentClient, T: ExternalTransfer> TransferWorker<'a, C, T> {
    /// Construct a worker. `tag` scopes the sweep to `PT_TAG` when monitor-only
    /// mode is enabled, or `None` to sweep every completed torrent.
    #[must_use]
    pub const fn new(client: &'a C, transfer: &'a T, tag: Option<String>) -> Self {
        Self {
            client,
            transfer,
            tag,
        }
    }

    /// Run one sweep. Transfer failures are logged, never propagated, and
    /// never block `mark_transferred`: retrying an unfixable path would loop
    /// forever, so every candidate is marked exactly once per sweep.
    ///
    /// # Errors
    ///
    /// Returns an error only if listing transferable torrents itself fails;
    /// per-item transfer/mark failures are handled internally.
    pub async fn sweep(&self) -> ClientResult<usize> {
        let tag = self.tag.as_deref();
        let transferable = self.client.list_transferable(tag).await?;
        let mut attempted = 0usize;

        for item in transferable {
            attempted += 1;
            if !self.transfer.transfer(&item.path).await {
                warn!(handle = %item.handle, path = %item.path, "external transfer failed");
            }
            if let Err(error) = self.client.mark_transferred(&item.handle).await {
                warn!(handle = %item.handle, %error, "failed to mark torrent transferred");
            }
        }

        Ok(attempted)
    }
}
