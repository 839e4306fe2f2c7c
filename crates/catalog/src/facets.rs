//! Season and quality facets extracted from file names
//!
//! A search usually returns every episode of every season in every
//! resolution. Facets let the bot ask "which season?" and "which quality?"
//! before showing a flat list.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::model::FileRecord;

fn season_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)s([0-9]{1,2})").expect("season pattern is valid"))
}

fn quality_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)([0-9]{3,4})p").expect("quality pattern is valid"))
}

/// Facets found in a single file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Normalized `S<2 digits>` tag
    pub season: Option<String>,
    /// Normalized `<digits>p` tag
    pub quality: Option<String>,
}

/// Extract the first season and the first quality marker from a file name.
///
/// `"Show.s5.480p"` gives `S05` and `480p`. Missing markers are `None`.
pub fn extract(file_name: &str) -> Metadata {
    let season = season_pattern()
        .captures(file_name)
        .map(|caps| format!("S{:0>2}", &caps[1]));
    let quality = quality_pattern()
        .captures(file_name)
        .map(|caps| format!("{}p", &caps[1]));

    Metadata { season, quality }
}

/// Grouping key for search results.
///
/// `Unsorted` is the bucket for files without a season marker and always
/// orders after every real season.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeasonKey {
    Season(String),
    Unsorted,
}

impl SeasonKey {
    /// Button / title label
    pub fn label(&self) -> &str {
        match self {
            SeasonKey::Season(tag) => tag,
            SeasonKey::Unsorted => "Other",
        }
    }
}

/// Search results bucketed by season
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonGroups {
    buckets: BTreeMap<SeasonKey, Vec<FileRecord>>,
}

impl SeasonGroups {
    /// Number of buckets with a real season tag
    pub fn season_count(&self) -> usize {
        self.buckets
            .keys()
            .filter(|key| matches!(key, SeasonKey::Season(_)))
            .count()
    }

    /// Real seasons in ascending order, with their files
    pub fn seasons(&self) -> impl Iterator<Item = (&str, &[FileRecord])> {
        self.buckets.iter().filter_map(|(key, files)| match key {
            SeasonKey::Season(tag) => Some((tag.as_str(), files.as_slice())),
            SeasonKey::Unsorted => None,
        })
    }

    /// Files without a season marker
    pub fn unsorted(&self) -> &[FileRecord] {
        self.get(&SeasonKey::Unsorted)
    }

    pub fn get(&self, key: &SeasonKey) -> &[FileRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of buckets, the sentinel included
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket records by season, keeping input order inside each bucket
pub fn group(records: &[FileRecord]) -> SeasonGroups {
    let mut buckets: BTreeMap<SeasonKey, Vec<FileRecord>> = BTreeMap::new();
    for record in records {
        let key = match extract(&record.display_name).season {
            Some(tag) => SeasonKey::Season(tag),
            None => SeasonKey::Unsorted,
        };
        buckets.entry(key).or_default().push(record.clone());
    }
    SeasonGroups { buckets }
}

fn resolution(quality: &str) -> u32 {
    quality.trim_end_matches('p').parse().unwrap_or(0)
}

/// Distinct quality tags in `records`, highest resolution first
pub fn distinct_qualities(records: &[FileRecord]) -> Vec<String> {
    let unique: BTreeSet<String> = records
        .iter()
        .filter_map(|record| extract(&record.display_name).quality)
        .collect();

    let mut qualities: Vec<String> = unique.into_iter().collect();
    qualities.sort_by(|a, b| resolution(b).cmp(&resolution(a)).then_with(|| a.cmp(b)));
    qualities
}

/// Records whose quality tag equals `quality`
pub fn with_quality(records: &[FileRecord], quality: &str) -> Vec<FileRecord> {
    records
        .iter()
        .filter(|record| extract(&record.display_name).quality.as_deref() == Some(quality))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileRecord {
        FileRecord::new(format!("ref-{}", name), name, -100, 1, "")
    }

    #[test]
    fn test_season_is_zero_padded() {
        assert_eq!(extract("Show S5 episode").season.as_deref(), Some("S05"));
        assert_eq!(extract("show.s12e03").season.as_deref(), Some("S12"));
        assert_eq!(extract("show.s01e01.720p.mkv").season.as_deref(), Some("S01"));
    }

    #[test]
    fn test_first_match_wins() {
        let meta = extract("show.s02.s03.480p.1080p.mkv");
        assert_eq!(meta.season.as_deref(), Some("S02"));
        assert_eq!(meta.quality.as_deref(), Some("480p"));
    }

    #[test]
    fn test_quality_extraction() {
        assert_eq!(extract("movie.2160P.mkv").quality.as_deref(), Some("2160p"));
        assert_eq!(extract("movie.720p.mkv").quality.as_deref(), Some("720p"));
        assert_eq!(extract("movie.72p.mkv").quality, None);
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(extract("documentary.mkv"), Metadata::default());

        let groups = group(&[file("documentary.mkv")]);
        assert_eq!(groups.season_count(), 0);
        assert_eq!(groups.unsorted().len(), 1);
    }

    #[test]
    fn test_group_single_season() {
        let records = vec![file("show.s01e01.720p.mkv"), file("show.s01e02.1080p.mkv")];
        let groups = group(&records);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.season_count(), 1);
        let s01 = groups.get(&SeasonKey::Season("S01".to_string()));
        assert_eq!(s01.len(), 2);
        assert_eq!(distinct_qualities(s01), vec!["1080p", "720p"]);
    }

    #[test]
    fn test_group_is_stable_and_ordered() {
        let records = vec![
            file("show.s02e01.mkv"),
            file("extras.mkv"),
            file("show.s01e02.mkv"),
            file("show.s01e01.mkv"),
        ];
        let groups = group(&records);

        let seasons: Vec<&str> = groups.seasons().map(|(tag, _)| tag).collect();
        assert_eq!(seasons, vec!["S01", "S02"]);

        let s01 = groups.get(&SeasonKey::Season("S01".to_string()));
        assert_eq!(s01[0].display_name, "show.s01e02.mkv");
        assert_eq!(s01[1].display_name, "show.s01e01.mkv");
        assert_eq!(groups.unsorted()[0].display_name, "extras.mkv");
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_sentinel_orders_last() {
        assert!(SeasonKey::Season("S99".to_string()) < SeasonKey::Unsorted);
        assert_eq!(SeasonKey::Unsorted.label(), "Other");
    }

    #[test]
    fn test_distinct_qualities_dedup_and_sort() {
        let records = vec![
            file("a.480p.mkv"),
            file("b.2160p.mkv"),
            file("c.480p.mkv"),
            file("d.mkv"),
            file("e.1080p.mkv"),
        ];
        assert_eq!(distinct_qualities(&records), vec!["2160p", "1080p", "480p"]);
    }

    #[test]
    fn test_with_quality() {
        let records = vec![file("a.480p.mkv"), file("b.1080p.mkv"), file("c.480p.mkv")];
        let filtered = with_quality(&records, "480p");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].display_name, "c.480p.mkv");
    }
}
