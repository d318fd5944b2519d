//! Feed-to-candidate pipeline: fetch, parse, filter, and title-parse.

use ptwatch_config::SiteConfig;
use ptwatch_core::{Candidate, MediaType};
use regex::Regex;
use tracing::warn;

use crate::error::{RssError, RssResult};
use crate::fetch::FeedFetcher;
use crate::parse::{parse_items, RawItem};
use crate::title_parse::parse_title;

/// Compiled include/exclude filter set for a site, with global extra rules
/// folded into the include set.
pub struct FilterSet {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl FilterSet {
    /// Compile a site's filter rules together with the global extra rules.
    pub fn compile(site: &SiteConfig, global_notes: &[String]) -> RssResult<Self> {
        let include = site
            .include_rules
            .iter()
            .chain(global_notes.iter())
            .map(|pattern| compile(pattern))
            .collect::<RssResult<Vec<_>>>()?;
        let exclude = site
            .exclude_rules
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<RssResult<Vec<_>>>()?;
        Ok(Self { include, exclude })
    }

    /// Whether a raw title passes this filter set: it must match at least
    /// one include pattern (or there are none) and no exclude pattern.
    #[must_use]
    pub fn accepts(&self, title: &str) -> bool {
        self.match_rank(title).is_some()
    }

    /// Index of the first include rule this title matches, or `None` if the
    /// title is rejected (excluded, or no include rule matches when at
    /// least one is configured).
    #[must_use]
    pub fn match_rank(&self, title: &str) -> Option<u32> {
        if self.exclude.iter().any(|re| re.is_match(title)) {
            return None;
        }
        if self.include.is_empty() {
            return Some(RESOURCE_PRIORITY_UNRANKED);
        }
        self.include
            .iter()
            .position(|re| re.is_match(title))
            .map(|index| index as u32)
    }
}

/// Resource priority assigned when no include rule is configured at all.
const RESOURCE_PRIORITY_UNRANKED: u32 = 99;

fn compile(pattern: &str) -> RssResult<Regex> {
    Regex::new(pattern).map_err(|source| RssError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Ingest a single site's feed into a list of candidates.
///
/// Fetch failures propagate (the caller decides whether to skip the site
/// for this cycle); malformed or filtered-out items are dropped silently,
/// one at a time, so one bad item never drops the rest of the feed.
pub async fn ingest_site(
    fetcher: &FeedFetcher,
    site: &SiteConfig,
    site_priority: i32,
    global_notes: &[String],
) -> RssResult<Vec<Candidate>> {
    let body = fetcher.fetch(&site.rss_url).await?;
    let items = parse_items(&site.rss_url, &body)?;
    let filters = FilterSet::compile(site, global_notes)?;

    let mut candidates = Vec::new();
    for item in items {
        let match_text = format!("{} {}", item.title, item.description);
        let Some(resource_priority) = filters.match_rank(&match_text) else {
            continue;
        };
        if let Some(candidate) = to_candidate(&item, site, site_priority, resource_priority) {
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

fn to_candidate(
    item: &RawItem,
    site: &SiteConfig,
    site_priority: i32,
    resource_priority: u32,
) -> Option<Candidate> {
    let media = parse_title(&item.title);
    if media.title.is_empty() {
        warn!(site = %site.name, title = %item.title, "dropping item with empty parsed title");
        return None;
    }

    // Size gating applies to movies only (§SiteConfig min_size/max_size docs).
    if media.kind == MediaType::Movie {
        if let Some(min) = site.min_size {
            if item.size != 0 && item.size < min {
                return None;
            }
        }
        if let Some(max) = site.max_size {
            if item.size != 0 && item.size > max {
                return None;
            }
        }
    }

    Some(Candidate {
        media,
        enclosure: item.enclosure.clone(),
        size: item.size,
        site: site.name.clone(),
        site_priority,
        resource_priority,
        raw_title: item.title.clone(),
        description: item.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(min_size: Option<u64>, max_size: Option<u64>) -> SiteConfig {
        SiteConfig {
            name: "example".to_string(),
            rss_url: "https://example.invalid/rss".to_string(),
            include_rules: vec![],
            exclude_rules: vec![],
            min_size,
            max_size,
            enabled: true,
        }
    }

    fn item(title: &str, size: u64) -> RawItem {
        RawItem {
            title: title.to_string(),
            enclosure: "https://example.invalid/x.torrent".to_string(),
            description: String::new(),
            size,
        }
    }

    #[test]
    fn filter_set_requires_include_and_rejects_exclude() {
        let site = SiteConfig {
            include_rules: vec!["1080p".to_string()],
            exclude_rules: vec!["CAM".to_string()],
            ..site(None, None)
        };
        let filters = FilterSet::compile(&site, &[]).expect("compiles");
        assert!(filters.accepts("Example.1080p.WEB-DL"));
        assert!(!filters.accepts("Example.720p.WEB-DL"));
        assert!(!filters.accepts("Example.1080p.CAM"));
    }

    #[test]
    fn to_candidate_rejects_movies_outside_size_bounds() {
        let site = site(Some(1_000), Some(2_000));
        assert!(to_candidate(&item("Example.Movie.1999", 500), &site, 1, 0).is_none());
        assert!(to_candidate(&item("Example.Movie.1999", 3_000), &site, 1, 0).is_none());
        assert!(to_candidate(&item("Example.Movie.1999", 1_500), &site, 1, 0).is_some());
    }

    #[test]
    fn to_candidate_never_size_gates_tv() {
        let site = site(Some(1_000), Some(2_000));
        let oversized = to_candidate(&item("Example.Show.2021.S01E02", 50_000), &site, 1, 0);
        assert!(oversized.is_some());
    }

    #[test]
    fn ingest_site_matches_filters_against_title_and_description() {
        let site = SiteConfig {
            exclude_rules: vec!["BANNED".to_string()],
            ..site(None, None)
        };
        let filters = FilterSet::compile(&site, &[]).expect("compiles");
        let match_text = format!("{} {}", "Example.Movie.1999", "Released by BANNED-GROUP");
        assert!(!filters.accepts(&match_text));
    }

    #[test]
    fn global_notes_are_folded_into_include_set() {
        let site = site(None, None);
        let filters = FilterSet::compile(&site, &["1080p".to_string()]).expect("compiles");
        assert!(filters.accepts("Example.1080p"));
        assert!(!filters.accepts("Example.720p"));
    }
}
