//! Extracts episode numbers from a torrent file's name, for per-file selection.

use std::sync::OnceLock;

use regex::Regex;

fn episode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)E(\d{1,3})(?!\d)").expect("valid episode pattern"))
}

/// Extract every episode number named in a file's path or name.
///
/// Files with no recognisable episode marker return an empty set and are
/// always treated as unselected.
#[must_use]
pub fn extract_episodes(file_name: &str) -> Vec<u32> {
    episode_pattern()
        .captures_iter(file_name)
        .filter_map(|captures| captures[1].parse::<u32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_single_episode_marker() {
        assert_eq!(extract_episodes("Show.S01E05.1080p.mkv"), vec![5]);
    }

    #[test]
    fn files_without_a_marker_are_empty() {
        assert!(extract_episodes("Show.NFO").is_empty());
        assert!(extract_episodes("Sample/sample.mkv").is_empty());
    }

    #[test]
    fn extracts_every_marker_in_a_combined_episode_file() {
        assert_eq!(extract_episodes("Show.S01E05E06.1080p.mkv"), vec![5, 6]);
    }
}
