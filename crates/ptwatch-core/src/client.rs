//! Engine-agnostic torrent-client capability contract.
//!
//! # Design
//! Backend asymmetry (qBittorrent-style tag resolution vs. Transmission-style
//! synchronous handles) is encapsulated entirely behind this trait: callers
//! never branch on backend kind. Implementations live in `ptwatch-driver`.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::model::MediaType;

/// Opaque handle identifying a torrent within a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct TorrentHandle(pub String);

impl TorrentHandle {
    /// Wrap a raw backend-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TorrentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file exposed by a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TorrentFileEntry {
    /// Backend-assigned file index.
    pub id: u32,
    /// File name or relative path within the torrent payload.
    pub name: String,
}

/// A torrent reported as completed and awaiting transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableTorrent {
    /// Handle of the completed torrent.
    pub handle: TorrentHandle,
    /// On-disk path of the completed payload.
    pub path: String,
}

/// Minimal status snapshot for an actively downloading torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadingHandle {
    /// Handle of the torrent.
    pub handle: TorrentHandle,
    /// Display name, when known.
    pub name: Option<String>,
}

/// Transfer counters reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Cumulative bytes uploaded.
    pub uploaded_bytes: u64,
    /// Cumulative bytes downloaded.
    pub downloaded_bytes: u64,
}

/// Capability contract implemented by each supported torrent-client backend.
///
/// The planner and driver depend only on this trait; qBittorrent-style and
/// Transmission-style backends implement it in `ptwatch-driver`.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Admit a new torrent. Returns the handle immediately when the backend
    /// supports it synchronously (Transmission-style), or `None` when the
    /// caller must resolve it separately by tag (qBittorrent-style).
    async fn add(
        &self,
        url: &str,
        media_type: MediaType,
        paused: bool,
        tag: Option<&str>,
    ) -> ClientResult<Option<TorrentHandle>>;

    /// Resolve a handle by tag. Only meaningful for backends whose `add` does
    /// not return a handle synchronously; others may return `Ok(None)` always.
    async fn resolve_by_tag(&self, tag: &str) -> ClientResult<Option<TorrentHandle>>;

    /// Select which files of a multi-file torrent should be downloaded.
    async fn set_file_selection(
        &self,
        handle: &TorrentHandle,
        selected: &[u32],
        unselected: &[u32],
    ) -> ClientResult<()>;

    /// List the files contained in a torrent.
    async fn list_files(&self, handle: &TorrentHandle) -> ClientResult<Vec<TorrentFileEntry>>;

    /// List torrents that are complete but not yet transferred, optionally scoped to a tag.
    async fn list_transferable(&self, tag: Option<&str>) -> ClientResult<Vec<TransferableTorrent>>;

    /// Mark a torrent as transferred so it is not offered again.
    async fn mark_transferred(&self, handle: &TorrentHandle) -> ClientResult<()>;

    /// List torrents whose seeding time has met or exceeded `seeding_time_secs`.
    async fn list_for_reap(
        &self,
        seeding_time_secs: u64,
        tag: Option<&str>,
    ) -> ClientResult<Vec<TorrentHandle>>;

    /// List actively downloading torrents, optionally scoped to a tag.
    async fn list_downloading(&self, tag: Option<&str>) -> ClientResult<Vec<DownloadingHandle>>;

    /// Start (or resume) a torrent.
    async fn start(&self, handle: &TorrentHandle) -> ClientResult<()>;

    /// Stop (pause) a torrent.
    async fn stop(&self, handle: &TorrentHandle) -> ClientResult<()>;

    /// Remove a torrent, optionally deleting its on-disk data.
    async fn delete(&self, handle: &TorrentHandle, delete_files: bool) -> ClientResult<()>;

    /// Report cumulative upload/download counters for the backend.
    async fn counters(&self) -> ClientResult<Counters>;

    /// Attach a tag to a torrent. Idempotent.
    async fn set_tag(&self, handle: &TorrentHandle, tag: &str) -> ClientResult<()>;

    /// Remove a tag from a torrent. Idempotent; missing tags are not an error.
    async fn remove_tag(&self, handle: &TorrentHandle, tag: &str) -> ClientResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display_renders_inner_id() {
        let handle = TorrentHandle::new("abc123");
        assert_eq!(handle.to_string(), "abc123");
    }
}
