//! Removes torrents that have seeded long enough, freeing client slots.

use ptwatch_core::{ClientResult, TorrentClient};
use tracing::info;

/// Scheduled job that deletes torrents past their configured seeding time.
pub struct SeedingReaper<'a, C: TorrentClient> {
    client: &'a C,
    seeding_time_secs: Option<u64>,
    tag: Option<String>,
}

impl<'a, C: TorrentClient> SeedingReaper<'a, C> {
    /// Construct a reaper. `seeding_time_secs` of `None` or `Some(0)` makes
    /// every sweep a no-op, matching the configured-time-unset case.
    #[must_use]
    pub const fn new(client: &'a C, seeding_time_secs: Option<u64>, tag: Option<String>) -> Self {
        Self {
            client,
            seeding_time_secs,
            tag,
        }
    }

    /// Run one sweep, returning the number of torrents deleted.
    ///
    /// # Errors
    ///
    /// Propagates the first client error encountered; reaping does not
    /// continue past a failure since a partially-applied sweep is safe to
    /// retry next tick.
    pub async fn sweep(&self) -> ClientResult<usize> {
        let Some(seeding_time_secs) = self.seeding_time_secs.filter(|&secs| secs > 0) else {
            return Ok(0);
        };

        let candidates = self
            .client
            .list_for_reap(seeding_time_secs, self.tag.as_deref())
            .await?;
        for handle in &candidates {
            self.client.delete(handle, true).await?;
            info!(%handle, "reaped seeded torrent");
        }
        Ok(candidates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ptwatch_core::{
        Counters, DownloadingHandle, MediaType, TorrentFileEntry, TorrentHandle, TransferableTorrent,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubClient {
        reapable: Vec<TorrentHandle>,
        deleted: Mutex<Vec<TorrentHandle>>,
    }

    #[async_trait]
    impl TorrentClient for StubClient {
        async fn add(
            &self,
            _url: &str,
            _media_type: MediaType,
            _paused: bool,
            _tag: Option<&str>,
        ) -> ClientResult<Option<TorrentHandle>> {
            unimplemented!()
        }
        async fn resolve_by_tag(&self, _tag: &str) -> ClientResult<Option<TorrentHandle>> {
            unimplemented!()
        }
        async fn set_file_selection(
            &self,
            _handle: &TorrentHandle,
            _selected: &[u32],
            _unselected: &[u32],
        ) -> ClientResult<()> {
            unimplemented!()
        }
        async fn list_files(&self, _handle: &TorrentHandle) -> ClientResult<Vec<TorrentFileEntry>> {
            unimplemented!()
        }
        async fn list_transferable(&self, _tag: Option<&str>) -> ClientResult<Vec<TransferableTorrent>> {
            unimplemented!()
        }
        async fn mark_transferred(&self, _handle: &TorrentHandle) -> ClientResult<()> {
            unimplemented!()
        }
        async fn list_for_reap(
            &self,
            _seeding_time_secs: u64,
            _tag: Option<&str>,
        ) -> ClientResult<Vec<TorrentHandle>> {
            Ok(self.reapable.clone())
        }
        async fn list_downloading(&self, _tag: Option<&str>) -> ClientResult<Vec<DownloadingHandle>> {
            unimplemented!()
        }
        async fn start(&self, _handle: &TorrentHandle) -> ClientResult<()> {
            unimplemented!()
        }
        async fn stop(&self, _handle: &TorrentHandle) -> ClientResult<()> {
            unimplemented!()
        }
        async fn delete(&self, handle: &TorrentHandle, _delete_files: bool) -> ClientResult<()> {
            self.deleted.lock().unwrap().push(handle.clone());
            Ok(())
        }
        async fn counters(&self) -> ClientResult<Counters> {
            unimplemented!()
        }
        async fn set_tag(&self, _handle: &TorrentHandle, _tag: &str) -> ClientResult<()> {
            unimplemented!()
        }
        async fn remove_tag(&self, _handle: &TorrentHandle, _tag: &str) -> ClientResult<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn unset_seeding_time_is_a_no_op() {
        let client = StubClient {
            reapable: vec![TorrentHandle::new("h1")],
            ..Default::default()
        };
        let reaper = SeedingReaper::new(&client, None, None);
        assert_eq!(reaper.sweep().await.expect("sweep succeeds"), 0);
        assert!(client.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_seeding_time_is_a_no_op() {
        let client = StubClient {
            reapable: vec![TorrentHandle::new("h1")],
            ..Default::default()
        };
        let reaper = SeedingReaper::new(&client, Some(0), None);
        assert_eq!(reaper.sweep().await.expect("sweep succeeds"), 0);
    }

    #[tokio::test]
    async fn deletes_every_reapable_handle_with_files() {
        let client = StubClient {
            reapable: vec![TorrentHandle::new("h1"), TorrentHandle::new("h2")],
            ..Default::default()
        };
        let reaper = SeedingReaper::new(&client, Some(86_400), None);
        assert_eq!(reaper.sweep().await.expect("sweep succeeds"), 2);
        assert_eq!(client.deleted.lock().unwrap().len(), 2);
    }
}
