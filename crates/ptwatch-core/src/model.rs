//! Core data model shared across the ptwatch workspace.
//!
//! # Design
//! - Pure data carriers with constructors that uphold the invariants spec'd
//!   for the subscription-reconciliation engine (sorted/deduped season and
//!   episode lists, `episodes.is_empty()` or exactly one season).
//! - Kept free of I/O; persistence and network concerns live in
//!   `ptwatch-store` and `ptwatch-rss`.

use serde::{Deserialize, Serialize};

/// Kind of content a `MediaItem` identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// A standalone film.
    Movie,
    /// A television series.
    Tv,
    /// An anime series, tracked like TV but resolved through a separate provider.
    Anime,
}

impl MediaType {
    /// Whether this kind is tracked by season/episode rather than as a single unit.
    #[must_use]
    pub const fn is_episodic(self) -> bool {
        !matches!(self, Self::Movie)
    }
}

/// Builds the canonical `title_key` used throughout the planner as a stable map key.
#[must_use]
pub fn title_key(title: &str, year: Option<i32>) -> String {
    let normalized = title.trim().to_ascii_lowercase();
    match year {
        Some(year) => format!("{normalized}::{year}"),
        None => normalized,
    }
}

/// Identifies a piece of content resolved via the media resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Movie, TV, or Anime.
    pub kind: MediaType,
    /// Canonical resolved title.
    pub title: String,
    /// Canonical resolved year, when known.
    pub year: Option<i32>,
    /// Stable key derived from `title` + `year`; equal keys denote the same work.
    pub title_key: String,
    /// Sorted, deduplicated season numbers this item covers.
    pub seasons: Vec<u32>,
    /// Sorted, deduplicated episode numbers within a single season (empty == whole season(s)).
    pub episodes: Vec<u32>,
    /// Resolution/codec/etc. tags extracted from the torrent title or subtitle.
    pub resource_tags: Vec<String>,
}

impl MediaItem {
    /// Construct a `MediaItem`, normalising season/episode lists and deriving `title_key`.
    ///
    /// # Panics
    ///
    /// Panics if `episodes` is non-empty and `seasons` does not contain exactly one entry
    /// after normalisation; this is an invariant the resolver must uphold before constructing
    /// an item, so violating it is a caller bug rather than recoverable input.
    #[must_use]
    pub fn new(
        kind: MediaType,
        title: impl Into<String>,
        year: Option<i32>,
        seasons: Vec<u32>,
        episodes: Vec<u32>,
        resource_tags: Vec<String>,
    ) -> Self {
        let title = title.into();
        let key = title_key(&title, year);
        let seasons = sorted_dedup(seasons);
        let episodes = sorted_dedup(episodes);
        assert!(
            episodes.is_empty() || seasons.len() == 1,
            "episodes.is_empty() or exactly one season is required, got seasons={seasons:?} episodes={episodes:?}"
        );
        Self {
            kind,
            title,
            year,
            title_key: key,
            seasons,
            episodes,
            resource_tags,
        }
    }

    /// The single season this item addresses, when unambiguous.
    #[must_use]
    pub fn single_season(&self) -> Option<u32> {
        match self.seasons.as_slice() {
            [season] => Some(*season),
            _ => None,
        }
    }

    /// Whether this item represents one or more whole seasons (no per-episode narrowing).
    #[must_use]
    pub fn is_whole_season_pack(&self) -> bool {
        self.kind.is_episodic() && self.episodes.is_empty() && !self.seasons.is_empty()
    }
}

fn sorted_dedup(mut values: Vec<u32>) -> Vec<u32> {
    values.sort_unstable();
    values.dedup();
    values
}

/// A torrent parsed from an RSS feed plus its resolved media identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Resolved media identity for this torrent.
    pub media: MediaItem,
    /// Download enclosure URL.
    pub enclosure: String,
    /// Declared size in bytes (0 when unknown).
    pub size: u64,
    /// Name of the site this candidate was pulled from.
    pub site: String,
    /// Higher is better; derived from configured site order.
    pub site_priority: i32,
    /// Lower ordinal is better; index of the matched include rule (99 if none).
    pub resource_priority: u32,
    /// Raw RSS `<title>` text, used as the deterministic tiebreaker.
    pub raw_title: String,
    /// Raw RSS `<description>` text, used for filter matching.
    pub description: String,
}

/// A single missing-content record within a `GapMap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEntry {
    /// Season number this entry addresses.
    pub season: u32,
    /// Missing episode numbers; empty means the whole season is missing.
    pub episodes: Vec<u32>,
    /// Total known episode count for the season, when available.
    pub total_episodes: u32,
}

impl GapEntry {
    /// Whether this entry represents a whole missing season.
    #[must_use]
    pub const fn is_whole_season(&self) -> bool {
        self.episodes.is_empty()
    }

    /// The effective episode set to match against: the literal set, or the full
    /// `[1..=total_episodes]` range when the entry represents a whole season.
    #[must_use]
    pub fn effective_episodes(&self) -> Vec<u32> {
        if self.episodes.is_empty() {
            (1..=self.total_episodes).collect()
        } else {
            self.episodes.clone()
        }
    }
}

/// Ordered mapping from `title_key` to its outstanding `GapEntry` list.
///
/// Insertion order is preserved (a `Vec`-backed map, not a `HashMap`) because
/// the planner's Pass B walks entries in insertion order by design.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapMap {
    entries: Vec<(String, Vec<GapEntry>)>,
}

impl GapMap {
    /// Construct an empty gap map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Read-only view of the gap entries for a title, in insertion order.
    #[must_use]
    pub fn get(&self, title_key: &str) -> Option<&[GapEntry]> {
        self.entries
            .iter()
            .find(|(key, _)| key == title_key)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Mutable view of the gap entries for a title, creating an empty bucket if absent.
    pub fn entry(&mut self, title_key: &str) -> &mut Vec<GapEntry> {
        if let Some(index) = self.entries.iter().position(|(key, _)| key == title_key) {
            return &mut self.entries[index].1;
        }
        self.entries.push((title_key.to_owned(), Vec::new()));
        let last = self.entries.len() - 1;
        &mut self.entries[last].1
    }

    /// Drop the bucket for a title entirely.
    pub fn remove_title(&mut self, title_key: &str) {
        self.entries.retain(|(key, _)| key != title_key);
    }

    /// Drop buckets that became empty, preserving the relative order of the rest.
    pub fn prune_empty(&mut self) {
        self.entries.retain(|(_, entries)| !entries.is_empty());
    }

    /// Iterate titles and their gap entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GapEntry])> {
        self.entries
            .iter()
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }

    /// Sum of `episodes.len()` across every entry, for the gap-monotonicity property.
    #[must_use]
    pub fn total_missing_episodes(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|(_, entries)| entries.iter())
            .map(|entry| entry.episodes.len())
            .sum()
    }

    /// Whether the title has no remaining gap entries (or was never present).
    #[must_use]
    pub fn is_closed(&self, title_key: &str) -> bool {
        self.get(title_key).is_none_or(<[GapEntry]>::is_empty)
    }
}

/// State machine for a persisted subscription (`R`/`D`/`S` in spec terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Ready: normal RSS matching applies.
    Ready,
    /// Pending research: awaiting a retry search pass.
    PendingResearch,
    /// Searching: a retry search is in flight.
    Searching,
}

/// A persisted subscription target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subscription {
    /// A movie the user wants downloaded.
    Movie {
        /// Canonical title.
        title: String,
        /// Canonical year.
        year: i32,
        /// Lifecycle state.
        state: SubscriptionState,
    },
    /// A single season of a TV (or anime) show the user wants downloaded.
    Tv {
        /// Canonical title.
        title: String,
        /// Canonical year, when known.
        year: Option<i32>,
        /// Season number tracked by this subscription row.
        season: u32,
        /// Residual missing-episode count, refreshed by the retry pass.
        lack_count: u32,
        /// Lifecycle state.
        state: SubscriptionState,
    },
}

impl Subscription {
    /// The `title_key` this subscription resolves to.
    #[must_use]
    pub fn title_key(&self) -> String {
        match self {
            Self::Movie { title, year, .. } => title_key(title, Some(*year)),
            Self::Tv { title, year, .. } => title_key(title, *year),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SubscriptionState {
        match self {
            Self::Movie { state, .. } | Self::Tv { state, .. } => *state,
        }
    }
}

/// Suppresses re-download of a `(title_key, season_episode_key)` pair already handled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RssHistoryKey {
    /// Canonical title key.
    pub title_key: String,
    /// Season/episode identifier, e.g. `"s02"` or `"s02e05"` or `"movie"`.
    pub season_episode_key: String,
}
