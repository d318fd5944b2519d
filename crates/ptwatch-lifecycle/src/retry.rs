//! Retries subscriptions stuck in `PendingResearch` via an on-demand search.

use async_trait::async_trait;
use ptwatch_core::{Subscription, SubscriptionState};
use tracing::info;

/// Result of running a single-item search for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search engine could not identify any matching media at all.
    NoMediaInfo,
    /// The search settled on a result; `residual_missing_episodes` is the
    /// count still outstanding for the matching season (0 for movies, and
    /// for TV when the season closed out).
    Settled {
        /// Remaining missing-episode count after this search.
        residual_missing_episodes: u32,
    },
}

/// On-demand single-item search, out of scope for this crate to implement.
///
/// A concrete adapter ultimately feeds results back through the same
/// candidate/planner pipeline used by the RSS ingest path.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Search for the given subscription and report the settled outcome.
    async fn search(&self, subscription: &Subscription) -> SearchOutcome;
}

/// Persistence boundary for subscription state transitions, out of scope for
/// this crate to implement; `ptwatch-app` adapts the store's repository.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// List every subscription currently in [`SubscriptionState::PendingResearch`].
    async fn list_pending_research(&self) -> Vec<Subscription>;

    /// Transition a subscription, identified by its `title_key`, to a new state.
    async fn set_state(&self, title_key: &str, state: SubscriptionState);

    /// Update a TV subscription's residual missing-episode count.
    async fn update_lack_count(&self, title_key: &str, season: u32, lack_count: u32);

    /// Remove a subscription entirely (its gap has fully closed).
    async fn delete(&self, title_key: &str);
}

/// Scheduled job that retries subscriptions awaiting a search fallback.
pub struct RssRetry<'a, R: SubscriptionRepository, S: Searcher> {
    repository: &'a R,
    searcher: &'a S,
}

impl<'a, R: SubscriptionRepository, S: Searcher> RssRetry<'a, R, S> {
    /// Construct the retry job against a repository and searcher.
    #[must_use]
    pub const fn new(repository: &'a R, searcher: &'a S) -> Self {
        Self {
            repository,
            searcher,
        }
    }

    /// Run one retry pass over every pending-research subscription.
    pub async fn run(&self) {
        for subscription in self.repository.list_pending_research().await {
            let title_key = subscription.title_key();
            self.repository
                .set_state(&title_key, SubscriptionState::Searching)
                .await;

            match self.searcher.search(&subscription).await {
                SearchOutcome::NoMediaInfo => {
                    self.repository
                        .set_state(&title_key, SubscriptionState::PendingResearch)
                        .await;
                }
                SearchOutcome::Settled {
                    residual_missing_episodes: 0,
                } => {
                    self.repository.delete(&title_key).await;
                    info!(%title_key, "subscription gap closed via retry search");
                }
                SearchOutcome::Settled {
                    residual_missing_episodes,
                } => {
                    if let Subscription::Tv { season, .. } = subscription {
                        self.repository
                            .update_lack_count(&title_key, season, residual_missing_episodes)
                            .await;
                    }
                    self.repository
                        .set_state(&title_key, SubscriptionState::Ready)
                        .await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubRepository {
        pending: Vec<Subscription>,
        states: Mutex<Vec<(String, SubscriptionState)>>,
        lack_counts: Mutex<Vec<(String, u32, u32)>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SubscriptionRepository for StubRepository {
        async fn list_pending_research(&self) -> Vec<Subscription> {
            self.pending.clone()
        }
        async fn set_state(&self, title_key: &str, state: SubscriptionState) {
            self.states
                .lock()
                .unwrap()
                .push((title_key.to_string(), state));
        }
        async fn update_lack_count(&self, title_key: &str, season: u32, lack_count: u32) {
            self.lack_counts
                .lock()
                .unwrap()
                .push((title_key.to_string(), season, lack_count));
        }
        async fn delete(&self, title_key: &str) {
            self.deleted.lock().unwrap().push(title_key.to_string());
        }
    }

    struct StubSearcher(SearchOutcome);

    #[async_trait]
    impl Searcher for StubSearcher {
        async fn search(&self, _subscription: &Subscription) -> SearchOutcome {
            self.0.clone()
        }
    }

    fn tv_subscription() -> Subscription {
        Subscription::Tv {
            title: "Show".to_string(),
            year: Some(2020),
            season: 1,
            lack_count: 2,
            state: SubscriptionState::PendingResearch,
        }
    }

    #[tokio::test]
    async fn no_media_info_returns_to_pending_research() {
        let repository = StubRepository {
            pending: vec![tv_subscription()],
            ..Default::default()
        };
        let searcher = StubSearcher(SearchOutcome::NoMediaInfo);
        RssRetry::new(&repository, &searcher).run().await;

        let states = repository.states.lock().unwrap();
        assert_eq!(states.last().unwrap().1, SubscriptionState::PendingResearch);
        assert!(repository.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fully_settled_deletes_subscription() {
        let repository = StubRepository {
            pending: vec![tv_subscription()],
            ..Default::default()
        };
        let searcher = StubSearcher(SearchOutcome::Settled {
            residual_missing_episodes: 0,
        });
        RssRetry::new(&repository, &searcher).run().await;

        assert_eq!(repository.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partially_settled_updates_lack_count_and_goes_ready() {
        let repository = StubRepository {
            pending: vec![tv_subscription()],
            ..Default::default()
        };
        let searcher = StubSearcher(SearchOutcome::Settled {
            residual_missing_episodes: 1,
        });
        RssRetry::new(&repository, &searcher).run().await;

        let lack_counts = repository.lack_counts.lock().unwrap();
        assert_eq!(lack_counts.as_slice(), &[("show::2020".to_string(), 1, 1)]);
        let states = repository.states.lock().unwrap();
        assert_eq!(states.last().unwrap().1, SubscriptionState::Ready);
    }
}
