use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::HashSet, future::Future, sync::Arc, time::Duration};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogEntry, Enrichment, ScoredEntry},
    services::{
        delivery::Messenger,
        formatting::NotificationFormatter,
        novelty::NoveltyTracker,
        providers::{CatalogProvider, RatingsProvider},
        ranking::RankingEngine,
    },
};

/// Knobs for polling and search
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub latest_limit: u32,
    pub search_limit: u32,
    pub max_search_results: usize,
    pub watch_queries: Vec<String>,
    pub check_interval: Duration,
    pub retry_delay: Duration,
    pub notification_delay: Duration,
}

/// Outcome of one polling cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub admitted: usize,
    pub notified: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Polls the catalog and delivers notifications for new entries
#[derive(Clone)]
pub struct Monitor {
    catalog: Arc<dyn CatalogProvider>,
    ratings: Option<Arc<dyn RatingsProvider>>,
    messenger: Arc<dyn Messenger>,
    tracker: NoveltyTracker,
    engine: Arc<RankingEngine>,
    formatter: Arc<NotificationFormatter>,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ratings: Option<Arc<dyn RatingsProvider>>,
        messenger: Arc<dyn Messenger>,
        tracker: NoveltyTracker,
        engine: RankingEngine,
        formatter: NotificationFormatter,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            catalog,
            ratings,
            messenger,
            tracker,
            engine: Arc::new(engine),
            formatter: Arc::new(formatter),
            settings,
        }
    }

    pub fn tracker(&self) -> &NoveltyTracker {
        &self.tracker
    }

    pub fn formatter(&self) -> &NotificationFormatter {
        &self.formatter
    }

    /// Latest listings plus watch-query results not already in the batch
    async fn fetch_batch(&self) -> AppResult<Vec<CatalogEntry>> {
        let mut batch = self.catalog.latest(self.settings.latest_limit).await?;
        let mut ids: HashSet<_> = batch.iter().filter_map(|e| e.id).collect();

        for query in &self.settings.watch_queries {
            match self.catalog.search_live(query, self.settings.search_limit).await {
                Ok(found) => {
                    for entry in found {
                        let fresh = entry.id.map_or(true, |id| ids.insert(id));
                        if fresh {
                            tracing::debug!(query = %query, title = %entry.title, "Added watch-query entry");
                            batch.push(entry);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, query = %query, "Watch query failed, skipping");
                }
            }
        }

        Ok(batch)
    }

    /// Runs one fetch → admit → score → dedup → deliver pass
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> AppResult<CycleReport> {
        let batch = self.fetch_batch().await?;
        let fetched = batch.len();

        let ranked = self.engine.rank(batch, now);
        let admitted = ranked.len();
        let fresh = self.tracker.filter_new(ranked).await;

        let mut report = CycleReport {
            fetched,
            admitted,
            notified: fresh.len(),
            ..CycleReport::default()
        };

        for (i, scored) in fresh.iter().enumerate() {
            if i > 0 && !self.settings.notification_delay.is_zero() {
                tokio::time::sleep(self.settings.notification_delay).await;
            }

            match self.deliver(scored, now).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::error!(error = %e, title = %scored.entry.title, "Failed to deliver notification");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            fetched = report.fetched,
            admitted = report.admitted,
            notified = report.notified,
            delivered = report.delivered,
            failed = report.failed,
            "Completed check"
        );

        Ok(report)
    }

    async fn enrichment(&self, scored: &ScoredEntry) -> Option<Enrichment> {
        let ratings = self.ratings.as_ref()?;
        match ratings.lookup(&scored.entry.title, scored.entry.year).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    provider = ratings.name(),
                    title = %scored.entry.title,
                    "Ratings lookup failed"
                );
                None
            }
        }
    }

    /// Sends with the poster when there is one, falling back to text
    async fn deliver(&self, scored: &ScoredEntry, now: DateTime<Utc>) -> AppResult<()> {
        let enrichment = self.enrichment(scored).await;
        let text = self.formatter.notification(scored, enrichment.as_ref(), now);

        if let Some(poster) = scored.entry.poster_url.as_deref() {
            match self.messenger.send_photo(poster, &text).await {
                Ok(()) => {
                    tracing::info!(title = %scored.entry.title, score = scored.score, "Sent notification with image");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, title = %scored.entry.title, "Photo send failed, falling back to text");
                }
            }
        }

        self.messenger.send_text(&text).await?;
        tracing::info!(title = %scored.entry.title, score = scored.score, "Sent text notification");
        Ok(())
    }

    /// On-demand search: entries at or above the minimum rating
    pub async fn search(&self, query: &str) -> AppResult<Vec<CatalogEntry>> {
        let min_rating = self.engine.admission().min_rating;
        let found = self.catalog.search(query, self.settings.search_limit).await?;
        let total = found.len();

        let results: Vec<CatalogEntry> = found
            .into_iter()
            .filter(|e| e.rating_or_zero() >= min_rating)
            .take(self.settings.max_search_results)
            .collect();

        tracing::info!(query = %query, total, kept = results.len(), min_rating, "Search filtered");
        Ok(results)
    }

    /// Latest admitted entries in priority order, ignoring novelty
    pub async fn whats_new(&self, now: DateTime<Utc>, limit: usize) -> AppResult<Vec<ScoredEntry>> {
        let batch = self.catalog.latest(self.settings.latest_limit).await?;
        let mut ranked = self.engine.rank(batch, now);
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Polls until `shutdown` resolves
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!(
            provider = self.catalog.name(),
            messenger = self.messenger.name(),
            enrichment = self.ratings.as_ref().map(|r| r.name()).unwrap_or("disabled"),
            min_rating = self.engine.admission().min_rating,
            min_year = self.engine.admission().min_year,
            interval_secs = self.settings.check_interval.as_secs(),
            "Starting movie monitor"
        );

        tokio::pin!(shutdown);
        loop {
            let span = tracing::info_span!("poll_cycle", cycle_id = %Uuid::new_v4());
            let wait = match self.run_cycle(Utc::now()).instrument(span).await {
                Ok(_) => self.settings.check_interval,
                Err(e) => {
                    tracing::error!(error = %e, "Polling cycle failed");
                    self.settings.retry_delay
                }
            };

            tracing::info!(wait_secs = wait.as_secs(), "Waiting until next check");
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    tracing::info!("Monitor stopped");
                    break;
                }
            }
        }
    }
}
