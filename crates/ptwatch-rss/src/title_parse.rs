//! Heuristic extraction of a [`MediaItem`] from a raw release title.

use std::sync::OnceLock;

use ptwatch_core::{MediaItem, MediaType};
use regex::Regex;

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?:19|20)\d{2}").expect("valid year pattern"))
}

fn season_episode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)S(\d{1,2})(?:E(\d{1,3}))?").expect("valid season/episode pattern")
    })
}

fn season_pack_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)Season[. ]?(\d{1,2})").expect("valid season pack pattern"))
}

/// Parse a raw release title into a [`MediaItem`].
///
/// Recognises `SxxEyy` and `Season N` markers as TV; anything else with a
/// 4-digit year is treated as a movie. Titles with neither a year nor a
/// season marker are still parsed, as a movie with no known year: the
/// planner is responsible for rejecting candidates it cannot match against
/// a subscription.
#[must_use]
pub fn parse_title(raw_title: &str) -> MediaItem {
    let normalized = raw_title.replace('.', " ").replace('_', " ");

    if let Some(captures) = season_episode_pattern().captures(&normalized) {
        let season: u32 = captures[1].parse().unwrap_or(1);
        let episodes = captures
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map_or_else(Vec::new, |episode| vec![episode]);
        let title = clean_title(&normalized[..captures.get(0).unwrap().start()]);
        let year = year_pattern()
            .find(&normalized)
            .and_then(|m| m.as_str().parse::<i32>().ok());
        return MediaItem::new(MediaType::Tv, title, year, vec![season], episodes, vec![]);
    }

    if let Some(captures) = season_pack_pattern().captures(&normalized) {
        let season: u32 = captures[1].parse().unwrap_or(1);
        let title = clean_title(&normalized[..captures.get(0).unwrap().start()]);
        let year = year_pattern()
            .find(&normalized)
            .and_then(|m| m.as_str().parse::<i32>().ok());
        return MediaItem::new(MediaType::Tv, title, year, vec![season], vec![], vec![]);
    }

    let year = year_pattern().find(&normalized).and_then(|m| m.as_str().parse::<i32>().ok());
    let title = year_pattern()
        .find(&normalized)
        .map_or_else(|| clean_title(&normalized), |m| clean_title(&normalized[..m.start()]));
    MediaItem::new(MediaType::Movie, title, year, vec![], vec![], vec![])
}

fn clean_title(fragment: &str) -> String {
    fragment.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_episode_release() {
        let item = parse_title("Example.Show.2021.S01E02.1080p.WEB-DL");
        assert_eq!(item.kind, MediaType::Tv);
        assert_eq!(item.title, "Example Show");
        assert_eq!(item.year, Some(2021));
        assert_eq!(item.seasons, vec![1]);
        assert_eq!(item.episodes, vec![2]);
    }

    #[test]
    fn parses_a_whole_season_pack() {
        let item = parse_title("Example.Show.2021.Season.2.1080p");
        assert_eq!(item.kind, MediaType::Tv);
        assert_eq!(item.seasons, vec![2]);
        assert!(item.episodes.is_empty());
    }

    #[test]
    fn parses_a_movie_release() {
        let item = parse_title("Example.Movie.1999.BluRay.1080p");
        assert_eq!(item.kind, MediaType::Movie);
        assert_eq!(item.title, "Example Movie");
        assert_eq!(item.year, Some(1999));
    }
}
