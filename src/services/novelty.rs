use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;

use crate::models::{EntryId, ScoredEntry};

/// Identifiers already surfaced to the destination channel
///
/// Grows monotonically for the lifetime of the value. Nothing is persisted, so a
/// restarted process starts empty and may surface earlier titles again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoveltyState {
    seen: HashSet<EntryId>,
}

impl NoveltyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-seeded with identifiers that should never be notified
    pub fn with_seen<I: IntoIterator<Item = EntryId>>(ids: I) -> Self {
        Self {
            seen: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Returns false when the id was already present
    fn record(&mut self, id: EntryId) -> bool {
        self.seen.insert(id)
    }
}

/// Keeps entries whose identifier has not been seen and records them
///
/// Input order is preserved. Entries without an identifier are dropped since
/// they cannot be deduplicated. Within one batch the first occurrence of an
/// identifier wins.
pub fn filter_new(entries: Vec<ScoredEntry>, state: &mut NoveltyState) -> Vec<ScoredEntry> {
    let total = entries.len();
    let fresh: Vec<ScoredEntry> = entries
        .into_iter()
        .filter(|entry| match entry.id() {
            Some(id) => state.record(id),
            None => {
                tracing::debug!(title = %entry.entry.title, "Skipping entry without identifier");
                false
            }
        })
        .collect();

    tracing::info!(
        total,
        new = fresh.len(),
        seen = state.len(),
        "Novelty filter applied"
    );

    fresh
}

/// Owner of the process-wide novelty state
///
/// Cycles may be triggered from the scheduler and from the control plane; the
/// lock is held for one whole pass over a batch so two cycles cannot both treat
/// the same identifier as new.
#[derive(Clone, Default)]
pub struct NoveltyTracker {
    state: Arc<Mutex<NoveltyState>>,
}

impl NoveltyTracker {
    pub fn new(state: NoveltyState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn filter_new(&self, entries: Vec<ScoredEntry>) -> Vec<ScoredEntry> {
        let mut state = self.state.lock().await;
        filter_new(entries, &mut state)
    }

    pub async fn seen_count(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn snapshot(&self) -> NoveltyState {
        self.state.lock().await.clone()
    }
}
