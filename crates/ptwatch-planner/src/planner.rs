//! Season-pack matching, per-episode pack matching, and leftover per-file
//! selection: the core download planning passes.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use ptwatch_core::{Candidate, GapMap, MediaType};

/// What the driver should do with a selected candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadDirective {
    /// Download the torrent in full.
    FullDownload,
    /// Download only the files covering the given episode numbers.
    PartialDownload {
        /// Episode numbers this torrent is being kept to cover.
        target: Vec<u32>,
    },
}

/// A candidate selected by the planner, with its download directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    /// The selected candidate.
    pub candidate: Candidate,
    /// What to do with it.
    pub directive: DownloadDirective,
}

/// Plan downloads for a filtered candidate list against the working gap map.
///
/// `gap_map` is mutated in place to reflect every selection; the returned
/// plan and the mutated map are deterministic for a given `(candidates,
/// gap_map)` pair, since candidates are sorted into a canonical pre-order
/// before any pass runs.
#[must_use]
pub fn plan(mut candidates: Vec<Candidate>, gap_map: &mut GapMap) -> Vec<PlannedItem> {
    sort_pre_order(&mut candidates);

    let mut selected_indices: HashSet<usize> = HashSet::new();
    let mut planned = Vec::new();

    pass_a_whole_season_packs(&candidates, gap_map, &mut selected_indices, &mut planned);
    pass_b_per_episode_packs(&candidates, gap_map, &mut selected_indices, &mut planned);
    pass_c_movies(&candidates, &mut selected_indices, &mut planned);
    pass_d_leftover_per_file(&candidates, gap_map, &mut selected_indices, &mut planned);

    planned
}

/// Sort candidates into the canonical pre-order: movies last, then
/// descending by (season-count, episode-count, site_priority,
/// resource_priority), ties broken ascending by `raw_title`.
fn sort_pre_order(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        let type_rank = |c: &Candidate| u8::from(c.media.kind == MediaType::Movie);
        type_rank(a)
            .cmp(&type_rank(b))
            .then(Reverse(a.media.seasons.len()).cmp(&Reverse(b.media.seasons.len())))
            .then(Reverse(a.media.episodes.len()).cmp(&Reverse(b.media.episodes.len())))
            .then(Reverse(a.site_priority).cmp(&Reverse(b.site_priority)))
            .then(Reverse(a.resource_priority).cmp(&Reverse(b.resource_priority)))
            .then(a.raw_title.cmp(&b.raw_title))
    });
}

/// Pass A — whole-season packs matched against seasons that are entirely missing.
fn pass_a_whole_season_packs(
    candidates: &[Candidate],
    gap_map: &mut GapMap,
    selected: &mut HashSet<usize>,
    planned: &mut Vec<PlannedItem>,
) {
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.media.kind == MediaType::Movie || !candidate.media.episodes.is_empty() {
            continue;
        }
        let title_key = candidate.media.title_key.clone();
        let need_seasons: BTreeSet<u32> = gap_map
            .get(&title_key)
            .into_iter()
            .flatten()
            .filter(|entry| entry.is_whole_season())
            .map(|entry| entry.season)
            .collect();
        let candidate_seasons: BTreeSet<u32> = candidate.media.seasons.iter().copied().collect();
        if candidate_seasons.is_empty() || !candidate_seasons.is_subset(&need_seasons) {
            continue;
        }

        gap_map
            .entry(&title_key)
            .retain(|entry| !(entry.is_whole_season() && candidate_seasons.contains(&entry.season)));
        gap_map.prune_empty();

        selected.insert(index);
        planned.push(PlannedItem {
            candidate: candidate.clone(),
            directive: DownloadDirective::FullDownload,
        });
    }
}

/// Pass B — per-episode packs matched against remaining gap entries, walked
/// in the gap map's insertion order.
fn pass_b_per_episode_packs(
    candidates: &[Candidate],
    gap_map: &mut GapMap,
    selected: &mut HashSet<usize>,
    planned: &mut Vec<PlannedItem>,
) {
    let title_keys: Vec<String> = gap_map.iter().map(|(key, _)| key.to_string()).collect();

    for title_key in title_keys {
        let seasons: Vec<u32> = gap_map
            .get(&title_key)
            .map(|entries| entries.iter().map(|entry| entry.season).collect())
            .unwrap_or_default();

        for season in seasons {
            loop {
                let effective: Vec<u32> = match gap_map
                    .get(&title_key)
                    .and_then(|entries| entries.iter().find(|entry| entry.season == season))
                {
                    Some(entry) => entry.effective_episodes(),
                    None => break,
                };
                let effective_set: BTreeSet<u32> = effective.iter().copied().collect();

                let found = candidates.iter().enumerate().find(|(index, candidate)| {
                    !selected.contains(index)
                        && candidate.media.kind != MediaType::Movie
                        && candidate.media.single_season() == Some(season)
                        && !candidate.media.episodes.is_empty()
                        && candidate.media.title_key == title_key
                        && candidate
                            .media
                            .episodes
                            .iter()
                            .all(|episode| effective_set.contains(episode))
                });

                let Some((index, candidate)) = found else {
                    break;
                };

                let covered: BTreeSet<u32> = candidate.media.episodes.iter().copied().collect();
                let entries = gap_map.entry(&title_key);
                if let Some(entry) = entries.iter_mut().find(|entry| entry.season == season) {
                    let mut remaining: Vec<u32> = effective
                        .iter()
                        .copied()
                        .filter(|episode| !covered.contains(episode))
                        .collect();
                    remaining.sort_unstable();
                    entry.episodes = remaining;
                }
                entries.retain(|entry| !(entry.season == season && entry.episodes.is_empty()));
                gap_map.prune_empty();

                selected.insert(index);
                planned.push(PlannedItem {
                    candidate: candidate.clone(),
                    directive: DownloadDirective::FullDownload,
                });
            }
        }
    }
}

/// Pass C — every movie candidate is selected unconditionally.
fn pass_c_movies(candidates: &[Candidate], selected: &mut HashSet<usize>, planned: &mut Vec<PlannedItem>) {
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.media.kind != MediaType::Movie || selected.contains(&index) {
            continue;
        }
        selected.insert(index);
        planned.push(PlannedItem {
            candidate: candidate.clone(),
            directive: DownloadDirective::FullDownload,
        });
    }
}

/// Pass D — leftover gaps closed via per-file selection out of an otherwise
/// unselected whole-season pack.
fn pass_d_leftover_per_file(
    candidates: &[Candidate],
    gap_map: &mut GapMap,
    selected: &mut HashSet<usize>,
    planned: &mut Vec<PlannedItem>,
) {
    let title_keys: Vec<String> = gap_map.iter().map(|(key, _)| key.to_string()).collect();

    for title_key in title_keys {
        let seasons: Vec<u32> = gap_map
            .get(&title_key)
            .map(|entries| entries.iter().map(|entry| entry.season).collect())
            .unwrap_or_default();

        for season in seasons {
            let target: Vec<u32> = match gap_map
                .get(&title_key)
                .and_then(|entries| entries.iter().find(|entry| entry.season == season))
            {
                Some(entry) if !entry.episodes.is_empty() => entry.effective_episodes(),
                _ => continue,
            };

            let found = candidates.iter().enumerate().find(|(index, candidate)| {
                !selected.contains(index)
                    && candidate.media.kind != MediaType::Movie
                    && candidate.media.episodes.is_empty()
                    && candidate.media.single_season() == Some(season)
                    && candidate.media.title_key == title_key
            });

            let Some((index, candidate)) = found else {
                continue;
            };

            gap_map
                .entry(&title_key)
                .retain(|entry| entry.season != season);
            gap_map.prune_empty();

            selected.insert(index);
            planned.push(PlannedItem {
                candidate: candidate.clone(),
                directive: DownloadDirective::PartialDownload { target },
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptwatch_core::{GapEntry, MediaItem};

    fn tv_candidate(title_key: &str, season: u32, episodes: Vec<u32>, raw_title: &str) -> Candidate {
        let media = MediaItem::new(
            MediaType::Tv,
            "Show",
            Some(2020),
            vec![season],
            episodes,
            vec![],
        );
        assert_eq!(media.title_key, title_key);
        Candidate {
            media,
            enclosure: format!("https://example.invalid/{raw_title}.torrent"),
            size: 0,
            site: "example".to_string(),
            site_priority: 1,
            resource_priority: 0,
            raw_title: raw_title.to_string(),
            description: String::new(),
        }
    }

    fn movie_candidate(raw_title: &str) -> Candidate {
        let media = MediaItem::new(MediaType::Movie, "Film", Some(2020), vec![], vec![], vec![]);
        Candidate {
            media,
            enclosure: format!("https://example.invalid/{raw_title}.torrent"),
            size: 1_000,
            site: "example".to_string(),
            site_priority: 1,
            resource_priority: 0,
            raw_title: raw_title.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn scenario_s1_whole_season_hit() {
        let mut gap_map = GapMap::new();
        gap_map.entry("show::2020").push(GapEntry {
            season: 2,
            episodes: vec![],
            total_episodes: 10,
        });

        let candidates = vec![
            tv_candidate("show::2020", 2, vec![], "A"),
            tv_candidate("show::2020", 2, vec![3], "B"),
        ];

        let planned = plan(candidates, &mut gap_map);

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].candidate.raw_title, "A");
        assert_eq!(planned[0].directive, DownloadDirective::FullDownload);
        assert!(gap_map.is_closed("show::2020"));
    }

    #[test]
    fn scenario_s2_mixed_pack() {
        let mut gap_map = GapMap::new();
        gap_map.entry("show::2020").push(GapEntry {
            season: 1,
            episodes: vec![5, 6, 7, 8],
            total_episodes: 10,
        });

        let candidates = vec![
            tv_candidate("show::2020", 1, vec![5, 6], "X"),
            tv_candidate("show::2020", 1, vec![7], "Y"),
            tv_candidate("show::2020", 1, vec![], "Z"),
        ];

        let planned = plan(candidates, &mut gap_map);

        assert_eq!(planned.len(), 3);
        let z = planned.iter().find(|item| item.candidate.raw_title == "Z").unwrap();
        assert_eq!(
            z.directive,
            DownloadDirective::PartialDownload { target: vec![8] }
        );
        assert!(gap_map.is_closed("show::2020"));
    }

    #[test]
    fn movies_are_selected_unconditionally() {
        let mut gap_map = GapMap::new();
        let planned = plan(vec![movie_candidate("M")], &mut gap_map);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].directive, DownloadDirective::FullDownload);
    }

    #[test]
    fn determinism_across_repeated_runs() {
        let mut gap_map_one = GapMap::new();
        gap_map_one.entry("show::2020").push(GapEntry {
            season: 1,
            episodes: vec![1, 2, 3],
            total_episodes: 3,
        });
        let mut gap_map_two = gap_map_one.clone();

        let candidates = vec![
            tv_candidate("show::2020", 1, vec![1], "A"),
            tv_candidate("show::2020", 1, vec![2, 3], "B"),
        ];

        let first = plan(candidates.clone(), &mut gap_map_one);
        let second = plan(candidates, &mut gap_map_two);

        assert_eq!(first, second);
        assert_eq!(gap_map_one, gap_map_two);
    }

    #[test]
    fn gap_monotonicity_never_increases() {
        let mut gap_map = GapMap::new();
        gap_map.entry("show::2020").push(GapEntry {
            season: 1,
            episodes: vec![1, 2],
            total_episodes: 2,
        });
        let before = gap_map.total_missing_episodes();

        let candidates = vec![tv_candidate("show::2020", 1, vec![1, 2], "A")];
        let _ = plan(candidates, &mut gap_map);

        assert!(gap_map.total_missing_episodes() <= before);
    }
}
