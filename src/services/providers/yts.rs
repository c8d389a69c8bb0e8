/// YTS catalog provider
///
/// API Flow:
/// 1. Latest: /list_movies.json?sort_by=date_added&order_by=desc → newest listings
/// 2. Search: /list_movies.json?query_term=...&sort_by=rating → matching titles
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiListResponse, CatalogEntry},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct YtsProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl YtsProvider {
    pub fn new(cache: Cache, api_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    fn list_url(&self) -> String {
        format!("{}/list_movies.json", self.api_url)
    }

    async fn list_movies(&self, params: &[(&str, String)]) -> AppResult<Vec<CatalogEntry>> {
        let response = self
            .http_client
            .get(self.list_url())
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "YTS API returned status {}: {}",
                status, body
            )));
        }

        let body: ApiListResponse = response.json().await?;
        decode_list(body)
    }

    async fn search_movies(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogEntry>> {
        let entries = self
            .list_movies(&[
                ("query_term", query.to_string()),
                ("limit", limit.to_string()),
                ("sort_by", "rating".to_string()),
            ])
            .await?;

        tracing::info!(
            query = %query,
            results = entries.len(),
            provider = "yts",
            "Title search completed"
        );

        Ok(entries)
    }
}

fn validate_query(query: &str) -> AppResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    Ok(query)
}

/// Converts a list response, rejecting envelopes whose status is not `ok`
fn decode_list(body: ApiListResponse) -> AppResult<Vec<CatalogEntry>> {
    if !body.is_ok() {
        return Err(AppError::ExternalApi(format!(
            "YTS API error: {}",
            body.status_message
                .as_deref()
                .unwrap_or("Unknown error")
        )));
    }

    Ok(body
        .into_movies()
        .into_iter()
        .map(CatalogEntry::from)
        .collect())
}

#[async_trait::async_trait]
impl CatalogProvider for YtsProvider {
    async fn latest(&self, limit: u32) -> AppResult<Vec<CatalogEntry>> {
        let entries = self
            .list_movies(&[
                ("limit", limit.to_string()),
                ("sort_by", "date_added".to_string()),
                ("order_by", "desc".to_string()),
            ])
            .await?;

        tracing::info!(
            fetched = entries.len(),
            limit,
            provider = "yts",
            "Latest listings fetched"
        );

        Ok(entries)
    }

    async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogEntry>> {
        let query = validate_query(query)?;

        cached!(
            self.cache,
            CacheKey::Search(format!("{}:{}", query, limit)),
            SEARCH_CACHE_TTL,
            self.search_movies(query, limit)
        )
    }

    async fn search_live(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogEntry>> {
        let query = validate_query(query)?;
        self.search_movies(query, limit).await
    }

    fn name(&self) -> &'static str {
        "yts"
    }
}
