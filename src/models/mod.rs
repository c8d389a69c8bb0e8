use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
};

pub mod omdb;
pub mod yts;

pub use omdb::{OmdbRating, OmdbResponse};
pub use yts::{ApiListData, ApiListResponse, ApiMovie, ApiTorrent};

/// Stable catalog identifier for a title+edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One downloadable variant of a listing (quality/encoding)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub quality: String,
    pub size: String,
    pub seeds: i64,
    #[serde(default)]
    pub peers: i64,
    #[serde(default)]
    pub url: Option<String>,
}

/// A movie listing as handed to the ranking core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: Option<EntryId>,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Raw listing timestamp as reported by the catalog, possibly malformed
    #[serde(default)]
    pub listed_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl CatalogEntry {
    /// Critic rating, with a missing value read as 0
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Release year, with a missing value read as 0
    pub fn year_or_zero(&self) -> i32 {
        self.year.unwrap_or(0)
    }

    pub fn genre_set(&self) -> HashSet<&str> {
        self.genres.iter().map(String::as_str).collect()
    }

    /// Parses the listing timestamp
    ///
    /// Accepts RFC 3339 (with `Z` or an offset) and the catalog's naive
    /// `YYYY-MM-DD HH:MM:SS` form, which is read as UTC.
    pub fn listed_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.listed_at.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    /// Total seeds across variants; negative counts contribute nothing
    pub fn total_seeds(&self) -> u64 {
        self.variants
            .iter()
            .map(|v| v.seeds.max(0) as u64)
            .sum()
    }
}

/// A catalog entry together with its priority score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub score: f64,
}

impl ScoredEntry {
    pub fn id(&self) -> Option<EntryId> {
        self.entry.id
    }
}

/// Secondary ratings and details for a title
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Enrichment {
    /// Rating value keyed by source name (e.g. "Rotten Tomatoes")
    pub ratings: BTreeMap<String, String>,
    pub plot: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub metascore: Option<String>,
    pub box_office: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::{entry, variant};
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_id_display() {
        assert_eq!(format!("{}", EntryId(68123)), "68123");
    }

    #[test]
    fn test_entry_id_serializes_as_number() {
        let json = serde_json::to_string(&EntryId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_missing_rating_and_year_read_as_zero() {
        let mut e = entry(1, "Untitled");
        e.rating = None;
        e.year = None;
        assert_eq!(e.rating_or_zero(), 0.0);
        assert_eq!(e.year_or_zero(), 0);
    }

    #[test]
    fn test_listed_at_parses_catalog_format() {
        let mut e = entry(1, "Heat");
        e.listed_at = Some("2025-07-10 14:32:11".to_string());
        assert_eq!(
            e.listed_at_utc(),
            Some(Utc.with_ymd_and_hms(2025, 7, 10, 14, 32, 11).unwrap())
        );
    }

    #[test]
    fn test_listed_at_parses_rfc3339_zulu() {
        let mut e = entry(1, "Heat");
        e.listed_at = Some("2025-07-10T14:32:11Z".to_string());
        assert_eq!(
            e.listed_at_utc(),
            Some(Utc.with_ymd_and_hms(2025, 7, 10, 14, 32, 11).unwrap())
        );
    }

    #[test]
    fn test_listed_at_parses_offset() {
        let mut e = entry(1, "Heat");
        e.listed_at = Some("2025-07-10T16:32:11+02:00".to_string());
        assert_eq!(
            e.listed_at_utc(),
            Some(Utc.with_ymd_and_hms(2025, 7, 10, 14, 32, 11).unwrap())
        );
    }

    #[test]
    fn test_listed_at_malformed_is_none() {
        let mut e = entry(1, "Heat");
        e.listed_at = Some("last tuesday".to_string());
        assert_eq!(e.listed_at_utc(), None);

        e.listed_at = Some("   ".to_string());
        assert_eq!(e.listed_at_utc(), None);

        e.listed_at = None;
        assert_eq!(e.listed_at_utc(), None);
    }

    #[test]
    fn test_total_seeds_ignores_negative_counts() {
        let mut e = entry(1, "Heat");
        e.variants = vec![variant("720p", 40), variant("1080p", -5), variant("2160p", 12)];
        assert_eq!(e.total_seeds(), 52);
    }

    #[test]
    fn test_genre_set_deduplicates() {
        let mut e = entry(1, "Heat");
        e.genres = vec!["Crime".to_string(), "Crime".to_string(), "Action".to_string()];
        assert_eq!(e.genre_set().len(), 2);
    }

    #[test]
    fn test_scored_entry_serializes_flat() {
        let scored = ScoredEntry {
            entry: entry(7, "Heat"),
            score: 12.5,
        };
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["title"], "Heat");
        assert_eq!(value["score"], 12.5);
    }
}
