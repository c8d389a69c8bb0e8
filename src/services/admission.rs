use std::collections::HashSet;

use crate::models::CatalogEntry;

pub const DEFAULT_MIN_RATING: f64 = 6.0;

pub const DEFAULT_EXCLUDED_GENRES: &[&str] = &[
    "Biography",
    "Documentary",
    "Drama",
    "History",
    "Sport",
    "Music",
    "Comedy",
];

/// Why an entry failed admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Rating,
    Year,
    ExcludedGenre,
}

/// Minimum rating, minimum year, and genre exclusion rules
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionPolicy {
    pub min_rating: f64,
    pub min_year: i32,
    pub excluded_genres: HashSet<String>,
}

impl AdmissionPolicy {
    /// Default policy; `current_year` becomes the minimum release year
    pub fn with_defaults(current_year: i32) -> Self {
        Self {
            min_rating: DEFAULT_MIN_RATING,
            min_year: current_year,
            excluded_genres: DEFAULT_EXCLUDED_GENRES
                .iter()
                .map(|g| g.to_string())
                .collect(),
        }
    }

    /// Checks one entry; a missing rating or year reads as 0
    pub fn check(&self, entry: &CatalogEntry) -> Result<(), Rejection> {
        if entry.rating_or_zero() < self.min_rating {
            return Err(Rejection::Rating);
        }
        if entry.year_or_zero() < self.min_year {
            return Err(Rejection::Year);
        }
        if entry.genres.iter().any(|g| self.excluded_genres.contains(g)) {
            return Err(Rejection::ExcludedGenre);
        }
        Ok(())
    }

    pub fn admits(&self, entry: &CatalogEntry) -> bool {
        self.check(entry).is_ok()
    }
}

/// Keeps the entries that pass `policy`, in input order
pub fn admit(entries: Vec<CatalogEntry>, policy: &AdmissionPolicy) -> Vec<CatalogEntry> {
    let total = entries.len();
    let admitted: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|entry| match policy.check(entry) {
            Ok(()) => true,
            Err(reason) => {
                tracing::trace!(title = %entry.title, ?reason, "Entry rejected");
                false
            }
        })
        .collect();

    tracing::debug!(
        total,
        admitted = admitted.len(),
        min_rating = policy.min_rating,
        min_year = policy.min_year,
        "Admission filter applied"
    );

    admitted
}
