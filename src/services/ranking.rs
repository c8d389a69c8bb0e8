use chrono::{DateTime, Utc};

use crate::{
    models::{CatalogEntry, ScoredEntry},
    services::{
        admission::{admit, AdmissionPolicy},
        novelty::{filter_new, NoveltyState},
        scoring::Scorer,
    },
};

/// Admission, scoring and novelty chained into one polling-cycle decision
#[derive(Debug, Clone)]
pub struct RankingEngine {
    admission: AdmissionPolicy,
    scorer: Scorer,
}

impl RankingEngine {
    pub fn new(admission: AdmissionPolicy, scorer: Scorer) -> Self {
        Self { admission, scorer }
    }

    pub fn admission(&self) -> &AdmissionPolicy {
        &self.admission
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Admitted entries, scored and in presentation order
    pub fn rank(&self, entries: Vec<CatalogEntry>, now: DateTime<Utc>) -> Vec<ScoredEntry> {
        let admitted = admit(entries, &self.admission);
        self.scorer.rank(admitted, now)
    }

    /// Entries to notify this cycle; records them in `state`
    pub fn select(
        &self,
        entries: Vec<CatalogEntry>,
        now: DateTime<Utc>,
        state: &mut NoveltyState,
    ) -> Vec<ScoredEntry> {
        filter_new(self.rank(entries, now), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures::entry, EntryId};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 12, 12, 0, 0).unwrap()
    }

    fn engine() -> RankingEngine {
        RankingEngine::new(AdmissionPolicy::with_defaults(2025), Scorer::default())
    }

    fn batch() -> Vec<CatalogEntry> {
        let mut rejected = entry(1, "Low Rated");
        rejected.rating = Some(5.9);

        let mut comedy = entry(2, "Laughs");
        comedy.genres = vec!["Comedy".to_string()];

        let mut fresh = entry(3, "28 Years Later");
        fresh.rating = Some(6.9);
        fresh.genres = vec!["Horror".to_string(), "Thriller".to_string()];
        fresh.listed_at = Some((now() - Duration::hours(2)).to_rfc3339());

        let mut undated = entry(4, "Quiet Room");
        undated.listed_at = None;

        vec![rejected, comedy, undated, fresh]
    }

    #[test]
    fn test_rank_drops_rejected_and_orders_by_score() {
        let ranked = engine().rank(batch(), now());
        let ids: Vec<EntryId> = ranked.iter().filter_map(ScoredEntry::id).collect();
        assert_eq!(ids, vec![EntryId(3), EntryId(4)]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_select_suppresses_repeat_cycles() {
        let engine = engine();
        let mut state = NoveltyState::new();

        let first = engine.select(batch(), now(), &mut state);
        assert_eq!(first.len(), 2);

        let second = engine.select(batch(), now() + Duration::hours(1), &mut state);
        assert!(second.is_empty());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_rejected_entries_are_not_recorded() {
        let engine = engine();
        let mut state = NoveltyState::new();
        engine.select(batch(), now(), &mut state);

        assert!(!state.contains(&EntryId(1)));
        assert!(!state.contains(&EntryId(2)));
    }

    #[test]
    fn test_empty_cycle() {
        let mut state = NoveltyState::new();
        assert!(engine().select(Vec::new(), now(), &mut state).is_empty());
        assert!(state.is_empty());
    }
}
