//! Gap reconciliation: matches a candidate against subscriptions and the
//! library, updating the working `GapMap` in place.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ptwatch_core::{Candidate, GapEntry, GapMap, MediaItem, MediaType, RssHistoryKey, Subscription};
use tracing::debug;

/// Canonical metadata for a release, as resolved against an external catalog.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    /// Canonicalized media identity (title, year, type, season/episode scope).
    pub media: MediaItem,
    /// Total episode count per season, for TV; empty for movies.
    pub season_totals: BTreeMap<u32, u32>,
}

/// External metadata resolution, out of scope for this crate to implement.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Resolve a raw release title to canonical media metadata.
    async fn resolve(&self, raw_title: &str) -> Option<ResolvedMedia>;
}

/// Library/media-server existence checks, out of scope for this crate to implement.
#[async_trait]
pub trait LibraryProbe: Send + Sync {
    /// Whether the given movie is already present in the library.
    async fn movie_present(&self, title_key: &str) -> bool;

    /// Episode numbers of `season` (out of `total_episodes`) not yet present.
    async fn missing_episodes(&self, title_key: &str, season: u32, total_episodes: u32) -> Vec<u32>;
}

/// RSS dedup history, out of scope for this crate to implement.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Whether this key has already been claimed by a prior pass.
    async fn contains(&self, key: &RssHistoryKey) -> bool;

    /// Record that this key has now been claimed.
    async fn record(&self, key: &RssHistoryKey);
}

/// Why a candidate was dropped before reaching the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The resolver could not identify this release.
    ResolutionFailed,
    /// This `(title_key, season_episode_key)` was already claimed.
    AlreadySeen,
    /// No subscription matches this release's title (+ year, for movies).
    NoSubscriptionMatch,
    /// The library already has every episode this candidate would provide.
    AlreadyHave,
}

/// Result of reconciling one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The candidate survives and should be handed to the planner.
    Accepted(Candidate),
    /// The candidate was dropped for the given reason.
    Dropped(DropReason),
    /// The named subscription's gap closed; the caller should retire it.
    Retired(String),
}

fn season_episode_key(media: &MediaItem) -> String {
    match media.single_season() {
        Some(season) if media.episodes.is_empty() => format!("s{season:02}"),
        Some(season) => format!(
            "s{season:02}e{}",
            media
                .episodes
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        ),
        None => "movie".to_string(),
    }
}

fn matches_subscription(media: &MediaItem, subscription: &Subscription) -> bool {
    match subscription {
        Subscription::Movie { title, year, .. } => {
            media.kind == MediaType::Movie && media.year == Some(*year) && titles_match(title, &media.title)
        }
        Subscription::Tv {
            title,
            year,
            season,
            ..
        } => {
            media.kind != MediaType::Movie
                && titles_match(title, &media.title)
                && (year.is_none() || *year == media.year)
                && media.seasons.contains(season)
        }
    }
}

fn titles_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Reconcile a single candidate against subscriptions, history, and the library.
///
/// The `gap_map` is mutated in place: a fresh `GapEntry` is created (or
/// extended) the first time a subscription's season is probed, so that later
/// candidates in the same run see the effect of earlier ones.
pub async fn reconcile_candidate(
    candidate: Candidate,
    subscriptions: &[Subscription],
    gap_map: &mut GapMap,
    history: &dyn HistoryStore,
    resolver: &dyn MediaResolver,
    probe: &dyn LibraryProbe,
) -> ReconcileOutcome {
    let Some(resolved) = resolver.resolve(&candidate.raw_title).await else {
        debug!(raw_title = %candidate.raw_title, "media resolution failed");
        return ReconcileOutcome::Dropped(DropReason::ResolutionFailed);
    };

    let mut candidate = candidate;
    candidate.media = resolved.media;

    let history_key = RssHistoryKey {
        title_key: candidate.media.title_key.clone(),
        season_episode_key: season_episode_key(&candidate.media),
    };
    if history.contains(&history_key).await {
        return ReconcileOutcome::Dropped(DropReason::AlreadySeen);
    }

    let Some(subscription) = subscriptions
        .iter()
        .find(|subscription| matches_subscription(&candidate.media, subscription))
    else {
        return ReconcileOutcome::Dropped(DropReason::NoSubscriptionMatch);
    };

    match subscription {
        Subscription::Movie { .. } => {
            if probe.movie_present(&candidate.media.title_key).await {
                return ReconcileOutcome::Retired(candidate.media.title_key.clone());
            }
        }
        Subscription::Tv { .. } => {
            let mut any_missing = false;
            for &season in &candidate.media.seasons {
                let total_episodes = resolved
                    .season_totals
                    .get(&season)
                    .copied()
                    .unwrap_or_default();
                if ensure_gap_entry(gap_map, &candidate.media.title_key, season, total_episodes, probe)
                    .await
                {
                    any_missing = true;
                }
            }

            let requested: Vec<u32> = if candidate.media.episodes.is_empty() {
                Vec::new()
            } else {
                candidate.media.episodes.clone()
            };
            if !requested.is_empty() {
                let still_missing = gap_map
                    .get(&candidate.media.title_key)
                    .into_iter()
                    .flatten()
                    .any(|entry| requested.iter().any(|ep| entry.effective_episodes().contains(ep)));
                if !still_missing {
                    return ReconcileOutcome::Dropped(DropReason::AlreadyHave);
                }
            } else if !any_missing {
                return ReconcileOutcome::Dropped(DropReason::AlreadyHave);
            }

            if gap_map.is_closed(&candidate.media.title_key) {
                return ReconcileOutcome::Retired(candidate.media.title_key.clone());
            }
        }
    }

    history.record(&history_key).await;
    ReconcileOutcome::Accepted(candidate)
}

/// Ensure a `GapEntry` for `(title_key, season)` reflects the library probe,
/// creating or updating it as needed. Returns whether the season still has
/// anything missing.
async fn ensure_gap_entry(
    gap_map: &mut GapMap,
    title_key: &str,
    season: u32,
    total_episodes: u32,
    probe: &dyn LibraryProbe,
) -> bool {
    let already_tracked = gap_map
        .get(title_key)
        .map(|entries| entries.iter().any(|entry| entry.season == season));

    if already_tracked == Some(true) {
        return gap_map
            .get(title_key)
            .into_iter()
            .flatten()
            .any(|entry| entry.season == season && !entry.episodes.is_empty());
    }

    let missing = probe.missing_episodes(title_key, season, total_episodes).await;
    if missing.is_empty() {
        return false;
    }
    let whole_season_missing = missing.len() as u32 == total_episodes;
    gap_map.entry(title_key).push(GapEntry {
        season,
        episodes: if whole_season_missing { Vec::new() } else { missing },
        total_episodes,
    });
    true
}
