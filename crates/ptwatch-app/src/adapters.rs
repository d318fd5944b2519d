//! Bridges persistent storage to the planner and lifecycle trait boundaries,
//! and stands in placeholders for collaborators this workspace does not
//! implement: metadata resolution, library catalog lookups, on-demand
//! search, external transfer, and the torrent-client backends themselves.
//! A real deployment replaces the placeholders with adapters for its chosen
//! media resolver, media server, indexer, and qBittorrent/Transmission RPC.

use async_trait::async_trait;
use ptwatch_core::{
    ClientError, ClientResult, Counters, DownloadingHandle, MediaType, RssHistoryKey, Subscription,
    SubscriptionState, TorrentClient, TorrentFileEntry, TorrentHandle, TransferableTorrent,
};
use ptwatch_lifecycle::{ExternalTransfer, SearchOutcome, Searcher, SubscriptionRepository};
use ptwatch_planner::{HistoryStore, LibraryProbe, MediaResolver, ResolvedMedia};
use ptwatch_store::Store;
use tracing::warn;

/// Adapts the store's RSS history repository to the planner's [`HistoryStore`] contract.
pub struct StoreHistory {
    store: Store,
}

impl StoreHistory {
    /// Wrap an opened store.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HistoryStore for StoreHistory {
    async fn contains(&self, key: &RssHistoryKey) -> bool {
        self.store.rss_history().contains(key).await.unwrap_or_else(|error| {
            warn!(%error, "history lookup failed; treating the release as unseen");
            false
        })
    }

    async fn record(&self, key: &RssHistoryKey) {
        if let Err(error) = self.store.rss_history().record(key).await {
            warn!(%error, "failed to record history key");
        }
    }
}

/// Adapts the store's subscription repository to the retry job's contract.
pub struct StoreSubscriptions {
    store: Store,
}

impl StoreSubscriptions {
    /// Wrap an opened store.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SubscriptionRepository for StoreSubscriptions {
    async fn list_pending_research(&self) -> Vec<Subscription> {
        match self.store.subscriptions().list_all().await {
            Ok(all) => all
                .into_iter()
                .filter(|subscription| subscription.state() == SubscriptionState::PendingResearch)
                .collect(),
            Err(error) => {
                warn!(%error, "failed to list subscriptions for retry");
                Vec::new()
            }
        }
    }

    async fn set_state(&self, title_key: &str, state: SubscriptionState) {
        let Ok(Some(mut subscription)) = self.store.subscriptions().get(title_key).await else {
            warn!(%title_key, "cannot transition state for an unknown subscription");
            return;
        };
        set_state(&mut subscription, state);
        if let Err(error) = self.store.subscriptions().upsert(&subscription).await {
            warn!(%error, "failed to persist subscription state transition");
        }
    }

    async fn update_lack_count(&self, title_key: &str, season: u32, lack_count: u32) {
        let Ok(Some(subscription)) = self.store.subscriptions().get(title_key).await else {
            warn!(%title_key, "cannot update lack_count for an unknown subscription");
            return;
        };
        let Subscription::Tv {
            title,
            year,
            season: existing_season,
            state,
            ..
        } = subscription
        else {
            warn!(%title_key, "lack_count update requested for a movie subscription");
            return;
        };
        if existing_season != season {
            warn!(%title_key, season, existing_season, "season mismatch on lack_count update");
            return;
        }
        let updated = Subscription::Tv {
            title,
            year,
            season,
            lack_count,
            state,
        };
        if let Err(error) = self.store.subscriptions().upsert(&updated).await {
            warn!(%error, "failed to persist lack_count update");
        }
    }

    async fn delete(&self, title_key: &str) {
        if let Err(error) = self.store.subscriptions().remove(title_key).await {
            warn!(%error, "failed to delete subscription");
        }
        if let Err(error) = self.store.rss_history().clear_for_title(title_key).await {
            warn!(%error, "failed to clear history for a retired subscription");
        }
    }
}

fn set_state(subscription: &mut Subscription, state: SubscriptionState) {
    match subscription {
        Subscription::Movie { state: current, .. } | Subscription::Tv { state: current, .. } => {
            *current = state;
        }
    }
}

/// Placeholder media resolver. A real deployment wires a metadata provider
/// (e.g. a TMDB/TVDB lookup) here; without one, every candidate is dropped
/// for failed resolution rather than guessed at.
pub struct UnresolvedMedia;

#[async_trait]
impl MediaResolver for UnresolvedMedia {
    async fn resolve(&self, raw_title: &str) -> Option<ResolvedMedia> {
        warn!(raw_title, "no media resolver configured; dropping candidate");
        None
    }
}

/// Placeholder library probe. A real deployment wires a media-server catalog
/// check here; without one, every episode is reported missing so subscribed
/// gaps never appear artificially closed.
pub struct UncheckedLibrary;

#[async_trait]
impl LibraryProbe for UncheckedLibrary {
    async fn movie_present(&self, _title_key: &str) -> bool {
        false
    }

    async fn missing_episodes(&self, _title_key: &str, _season: u32, total_episodes: u32) -> Vec<u32> {
        (1..=total_episodes).collect()
    }
}

/// Placeholder external transfer. A real deployment wires a filesystem move
/// or remote copy here.
pub struct NoTransfer;

#[async_trait]
impl ExternalTransfer for NoTransfer {
    async fn transfer(&self, path: &str) -> bool {
        warn!(path, "no external transfer configured");
        false
    }
}

/// Placeholder search fallback. A real deployment wires an indexer search
/// client here.
pub struct NoSearcher;

#[async_trait]
impl Searcher for NoSearcher {
    async fn search(&self, subscription: &Subscription) -> SearchOutcome {
        warn!(title_key = %subscription.title_key(), "no retry searcher configured");
        SearchOutcome::NoMediaInfo
    }
}

/// Placeholder torrent-client backend. A real deployment selects a
/// qBittorrent- or Transmission-style driver based on
/// [`ptwatch_config::ClientBackend`]; every call here reports the
/// capability as unsupported so the scheduler jobs fail loudly rather than
/// silently no-op against a backend that was never wired up.
pub struct UnconfiguredClient;

#[async_trait]
impl TorrentClient for UnconfiguredClient {
    async fn add(
        &self,
        _url: &str,
        _media_type: MediaType,
        _paused: bool,
        _tag: Option<&str>,
    ) -> ClientResult<Option<TorrentHandle>> {
        Err(ClientError::Unsupported { operation: "add" })
    }

    async fn resolve_by_tag(&self, _tag: &str) -> ClientResult<Option<TorrentHandle>> {
        Err(ClientError::Unsupported {
            operation: "resolve_by_tag",
        })
    }

    async fn set_file_selection(
        &self,
        _handle: &TorrentHandle,
        _selected: &[u32],
        _unselected: &[u32],
    ) -> ClientResult<()> {
        Err(ClientError::Unsupported {
            operation: "set_file_selection",
        })
    }

    async fn list_files(&self, _handle: &TorrentHandle) -> ClientResult<Vec<TorrentFileEntry>> {
        Err(ClientError::Unsupported {
            operation: "list_files",
        })
    }

    async fn list_transferable(&self, _tag: Option<&str>) -> ClientResult<Vec<TransferableTorrent>> {
        Err(ClientError::Unsupported {
            operation: "list_transferable",
        })
    }

    async fn mark_transferred(&self, _handle: &TorrentHandle) -> ClientResult<()> {
        Err(ClientError::Unsupported {
            operation: "mark_transferred",
        })
    }

    async fn list_for_reap(
        &self,
        _seeding_time_secs: u64,
        _tag: Option<&str>,
    ) -> ClientResult<Vec<TorrentHandle>> {
        Err(ClientError::Unsupported {
            operation: "list_for_reap",
        })
    }

    async fn list_downloading(&self, _tag: Option<&str>) -> ClientResult<Vec<DownloadingHandle>> {
        Err(ClientError::Unsupported {
            operation: "list_downloading",
        })
    }

    async fn start(&self, _handle: &TorrentHandle) -> ClientResult<()> {
        Err(ClientError::Unsupported { operation: "start" })
    }

    async fn stop(&self, _handle: &TorrentHandle) -> ClientResult<()> {
        Err(ClientError::Unsupported { operation: "stop" })
    }

    async fn delete(&self, _handle: &TorrentHandle, _delete_files: bool) -> ClientResult<()> {
        Err(ClientError::Unsupported {
            operation: "delete",
        })
    }

    async fn counters(&self) -> ClientResult<Counters> {
        Err(ClientError::Unsupported {
            operation: "counters",
        })
    }

    async fn set_tag(&self, _handle: &TorrentHandle, _tag: &str) -> ClientResult<()> {
        Err(ClientError::Unsupported {
            operation: "set_tag",
        })
    }

    async fn remove_tag(&self, _handle: &TorrentHandle, _tag: &str) -> ClientResult<()> {
        Err(ClientError::Unsupported {
            operation: "remove_tag",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptwatch_store::Store;

    async fn fresh_store() -> Store {
        let pool = sqlx::SqlitePool::connect(":memory:").await.expect("connect");
        Store::from_pool(pool).await.expect("migrate")
    }

    #[tokio::test]
    async fn store_history_round_trips_through_the_trait() {
        let store = fresh_store().await;
        let adapter = StoreHistory::new(store);
        let key = RssHistoryKey {
            title_key: "show::2020".to_string(),
            season_episode_key: "s01e01".to_string(),
        };
        assert!(!adapter.contains(&key).await);
        adapter.record(&key).await;
        assert!(adapter.contains(&key).await);
    }

    #[tokio::test]
    async fn store_subscriptions_lists_only_pending_research() {
        let store = fresh_store().await;
        store
            .subscriptions()
            .upsert(&Subscription::Movie {
                title: "Ready Movie".to_string(),
                year: 2020,
                state: SubscriptionState::Ready,
            })
            .await
            .expect("upsert ready");
        store
            .subscriptions()
            .upsert(&Subscription::Tv {
                title: "Pending Show".to_string(),
                year: Some(2021),
                season: 1,
                lack_count: 2,
                state: SubscriptionState::PendingResearch,
            })
            .await
            .expect("upsert pending");

        let adapter = StoreSubscriptions::new(store);
        let pending = adapter.list_pending_research().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title_key(), "pending show::2021");
    }

    #[tokio::test]
    async fn store_subscriptions_delete_clears_history_too() {
        let store = fresh_store().await;
        let subscription = Subscription::Movie {
            title: "Gone".to_string(),
            year: 2019,
            state: SubscriptionState::Ready,
        };
        store.subscriptions().upsert(&subscription).await.expect("upsert");
        let history_key = RssHistoryKey {
            title_key: subscription.title_key(),
            season_episode_key: "movie".to_string(),
        };
        store.rss_history().record(&history_key).await.expect("record");

        let adapter = StoreSubscriptions::new(store);
        adapter.delete(&subscription.title_key()).await;

        assert!(adapter
            .list_pending_research()
            .await
            .iter()
            .all(|s| s.title_key() != subscription.title_key()));
    }

    #[tokio::test]
    async fn unconfigured_client_reports_unsupported() {
        let client = UnconfiguredClient;
        let error = client
            .add("https://example.invalid/x.torrent", MediaType::Movie, false, None)
            .await
            .expect_err("placeholder backend never succeeds");
        assert!(matches!(error, ClientError::Unsupported { operation: "add" }));
    }
}
