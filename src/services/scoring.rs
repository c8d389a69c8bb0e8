use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::{
    models::{CatalogEntry, ScoredEntry},
    services::patterns::TitleClassifier,
};

pub const DEFAULT_HIGH_ATTENTION_GENRES: &[&str] =
    &["Action", "Adventure", "Thriller", "Sci-Fi", "Horror"];

pub const DEFAULT_MAINSTREAM_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Crime",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "War",
    "Western",
];

/// Bonus awarded when an age (hours, seeds) falls within a bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tier<T> {
    pub bound: T,
    pub bonus: f64,
}

/// Point values for each scoring signal
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub rating_weight: f64,
    /// Ascending by hours; first tier with `hours <= bound` wins
    pub listing_tiers: Vec<Tier<f64>>,
    /// Listed longer ago than every tier
    pub listing_stale_bonus: f64,
    /// Listing timestamp missing or unparseable
    pub listing_unknown_bonus: f64,
    /// Index is years before the current year; index 0 also covers future years
    pub release_year_bonuses: Vec<f64>,
    pub high_attention_genre_bonus: f64,
    pub mainstream_genre_bonus: f64,
    pub high_attention_combo_bonus: f64,
    pub mainstream_combo_bonus: f64,
    pub genre_combo_threshold: usize,
    pub sequel_bonus: f64,
    pub digit_bonus: f64,
    pub franchise_bonus: f64,
    pub variant_bonus: f64,
    pub variant_cap: usize,
    /// Descending by seeds; first tier with `total > bound` wins
    pub seed_tiers: Vec<Tier<u64>>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rating_weight: 3.0,
            listing_tiers: vec![
                Tier { bound: 24.0, bonus: 100.0 },
                Tier { bound: 72.0, bonus: 60.0 },
                Tier { bound: 168.0, bonus: 40.0 },
                Tier { bound: 720.0, bonus: 20.0 },
            ],
            listing_stale_bonus: 10.0,
            listing_unknown_bonus: 15.0,
            release_year_bonuses: vec![25.0, 15.0, 8.0],
            high_attention_genre_bonus: 5.0,
            mainstream_genre_bonus: 3.0,
            high_attention_combo_bonus: 15.0,
            mainstream_combo_bonus: 8.0,
            genre_combo_threshold: 2,
            sequel_bonus: 20.0,
            digit_bonus: 15.0,
            franchise_bonus: 25.0,
            variant_bonus: 2.0,
            variant_cap: 3,
            seed_tiers: vec![
                Tier { bound: 200, bonus: 10.0 },
                Tier { bound: 100, bonus: 6.0 },
                Tier { bound: 50, bonus: 3.0 },
            ],
        }
    }
}

/// Per-signal contributions to a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub listing_recency: f64,
    pub release_year: f64,
    pub genres: f64,
    pub title: f64,
    pub popularity: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.rating
            + self.listing_recency
            + self.release_year
            + self.genres
            + self.title
            + self.popularity
    }
}

/// Priority scorer for admitted entries
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    high_attention_genres: HashSet<String>,
    mainstream_genres: HashSet<String>,
    classifier: TitleClassifier,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(
            ScoringWeights::default(),
            DEFAULT_HIGH_ATTENTION_GENRES.iter().map(|g| g.to_string()).collect(),
            DEFAULT_MAINSTREAM_GENRES.iter().map(|g| g.to_string()).collect(),
            TitleClassifier::default(),
        )
    }
}

impl Scorer {
    pub fn new(
        weights: ScoringWeights,
        high_attention_genres: HashSet<String>,
        mainstream_genres: HashSet<String>,
        classifier: TitleClassifier,
    ) -> Self {
        Self {
            weights,
            high_attention_genres,
            mainstream_genres,
            classifier,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn classifier(&self) -> &TitleClassifier {
        &self.classifier
    }

    pub fn score(&self, entry: &CatalogEntry, now: DateTime<Utc>) -> f64 {
        self.breakdown(entry, now).total()
    }

    pub fn breakdown(&self, entry: &CatalogEntry, now: DateTime<Utc>) -> ScoreBreakdown {
        ScoreBreakdown {
            rating: entry.rating_or_zero() * self.weights.rating_weight,
            listing_recency: self.listing_recency(entry, now),
            release_year: self.release_year(entry, now.year()),
            genres: self.genres(entry),
            title: self.title(entry),
            popularity: self.popularity(entry),
        }
    }

    fn listing_recency(&self, entry: &CatalogEntry, now: DateTime<Utc>) -> f64 {
        let Some(listed_at) = entry.listed_at_utc() else {
            return self.weights.listing_unknown_bonus;
        };

        let hours = (now - listed_at).num_seconds() as f64 / 3600.0;
        self.weights
            .listing_tiers
            .iter()
            .find(|tier| hours <= tier.bound)
            .map(|tier| tier.bonus)
            .unwrap_or(self.weights.listing_stale_bonus)
    }

    fn release_year(&self, entry: &CatalogEntry, current_year: i32) -> f64 {
        let years_back = current_year.saturating_sub(entry.year_or_zero()).max(0) as usize;
        self.weights
            .release_year_bonuses
            .get(years_back)
            .copied()
            .unwrap_or(0.0)
    }

    fn genres(&self, entry: &CatalogEntry) -> f64 {
        let genres = entry.genre_set();
        let high = genres
            .iter()
            .filter(|g| self.high_attention_genres.contains(**g))
            .count();
        let mainstream = genres
            .iter()
            .filter(|g| self.mainstream_genres.contains(**g))
            .count();

        let w = &self.weights;
        let mut points = high as f64 * w.high_attention_genre_bonus
            + mainstream as f64 * w.mainstream_genre_bonus;
        if high >= w.genre_combo_threshold {
            points += w.high_attention_combo_bonus;
        }
        if mainstream >= w.genre_combo_threshold {
            points += w.mainstream_combo_bonus;
        }
        points
    }

    fn title(&self, entry: &CatalogEntry) -> f64 {
        let traits = self.classifier.classify(&entry.title);
        let w = &self.weights;

        let mut points = 0.0;
        if traits.sequel {
            points += w.sequel_bonus;
        }
        if traits.has_digit {
            points += w.digit_bonus;
        }
        if traits.franchise {
            points += w.franchise_bonus;
        }
        points
    }

    fn popularity(&self, entry: &CatalogEntry) -> f64 {
        if entry.variants.is_empty() {
            return 0.0;
        }

        let variants = entry.variants.len().min(self.weights.variant_cap);
        let total_seeds = entry.total_seeds();
        let seed_bonus = self
            .weights
            .seed_tiers
            .iter()
            .find(|tier| total_seeds > tier.bound)
            .map(|tier| tier.bonus)
            .unwrap_or(0.0);

        variants as f64 * self.weights.variant_bonus + seed_bonus
    }

    /// Scores every entry and orders them for presentation
    ///
    /// Descending by score, then by critic rating; exact ties keep input order.
    pub fn rank(&self, entries: Vec<CatalogEntry>, now: DateTime<Utc>) -> Vec<ScoredEntry> {
        let mut scored: Vec<ScoredEntry> = entries
            .into_iter()
            .map(|entry| {
                let score = self.score(&entry, now);
                ScoredEntry { entry, score }
            })
            .collect();

        sort_for_presentation(&mut scored);
        scored
    }
}

/// Stable sort: score desc, then rating desc
pub fn sort_for_presentation(entries: &mut [ScoredEntry]) {
    entries.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            b.entry
                .rating_or_zero()
                .total_cmp(&a.entry.rating_or_zero())
        })
    });
}
