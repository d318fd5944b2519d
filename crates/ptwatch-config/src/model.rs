//! Typed configuration models.

use serde::{Deserialize, Serialize};

/// Fixed tag used to distinguish torrents this system manages (§6 `PT_TAG`).
pub const DEFAULT_PT_TAG: &str = "PT_TAG";

/// Which torrent-client backend to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientBackend {
    /// qBittorrent-style backend (async handle resolution by tag).
    Qbittorrent,
    /// Transmission-style backend (synchronous handle on add).
    Transmission,
}

/// `pt.*` settings (§6 Config surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtSettings {
    /// Backend to drive.
    pub pt_client: Option<ClientBackend>,
    /// Seeding time in days before a completed torrent is reaped; 0/missing disables reaping.
    #[serde(default)]
    pub pt_seeding_time: f64,
    /// When true, only tagged torrents are visible to transfer/reap/list-downloading.
    #[serde(default)]
    pub pt_monitor_only: bool,
    /// Tag applied to torrents this system manages.
    #[serde(default = "default_pt_tag")]
    pub pt_tag: String,
}

fn default_pt_tag() -> String {
    DEFAULT_PT_TAG.to_string()
}

impl PtSettings {
    /// Whether the seeding-time reaper should run at all.
    #[must_use]
    pub fn reaping_enabled(&self) -> bool {
        self.pt_seeding_time > 0.0
    }

    /// Seeding time expressed in whole seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn seeding_time_secs(&self) -> u64 {
        (self.pt_seeding_time * 86_400.0).max(0.0) as u64
    }
}

/// Per-site RSS feed configuration and filter rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name.
    pub name: String,
    /// RSS feed URL.
    pub rss_url: String,
    /// Include-any regex patterns; empty means "match everything".
    #[serde(default)]
    pub include_rules: Vec<String>,
    /// Exclude-any regex patterns.
    #[serde(default)]
    pub exclude_rules: Vec<String>,
    /// Minimum acceptable size in bytes (movies only).
    pub min_size: Option<u64>,
    /// Maximum acceptable size in bytes (movies only).
    pub max_size: Option<u64>,
    /// Whether this site is actively polled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

const fn default_true() -> bool {
    true
}

/// Global extra filter rules injected into every site's filter context (§6 `rss_rule.note`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RssRuleConfig {
    /// Extra string rules appended to every site's include set.
    #[serde(default)]
    pub note: Vec<String>,
}

/// Subtitle provider, peripheral to the core download pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleServer {
    /// opensubtitles.org-compatible provider.
    Opensubtitles,
    /// ChineseSubFinder self-hosted provider.
    Chinesesubfinder,
}

/// Subtitle provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Which provider to use.
    pub server: SubtitleServer,
    /// Provider credentials, keyed by field name (e.g. `"username"`, `"api_key"`).
    #[serde(default)]
    pub credentials: std::collections::BTreeMap<String, String>,
}

/// Root configuration document (§6 Config surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Torrent-client settings.
    pub pt: PtSettings,
    /// Per-site RSS configuration, in priority order (earlier = higher `site_priority`).
    pub sites: Vec<SiteConfig>,
    /// Global extra filter rules.
    #[serde(default)]
    pub rss_rule: RssRuleConfig,
    /// Optional subtitle provider configuration.
    pub subtitle: Option<SubtitleConfig>,
}
