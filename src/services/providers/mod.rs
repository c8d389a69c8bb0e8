/// External data providers
///
/// Catalog providers supply listings for polling and search; ratings providers
/// supply optional enrichment for notifications. Everything here is I/O; the
/// ranking core only ever sees the `CatalogEntry` values they return.
use crate::{
    error::AppResult,
    models::{CatalogEntry, Enrichment},
};

pub mod omdb;
pub mod yts;

/// Source of movie listings
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Most recently listed entries, newest first
    async fn latest(&self, limit: u32) -> AppResult<Vec<CatalogEntry>>;

    /// Free-text title search; providers may serve this from a cache
    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogEntry>>;

    /// Title search that always hits the catalog, used by polling
    async fn search_live(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogEntry>> {
        self.search(query, limit).await
    }

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Secondary ratings source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsProvider: Send + Sync {
    /// `Ok(None)` when the provider has no record of the title
    async fn lookup(&self, title: &str, year: Option<i32>) -> AppResult<Option<Enrichment>>;

    fn name(&self) -> &'static str;
}
