/// OMDb ratings provider
///
/// Looks titles up by name and year and returns Rotten Tomatoes, Metacritic
/// and other ratings plus short details. Lookups are cached for a week.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Enrichment, OmdbResponse},
    services::providers::RatingsProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const RATINGS_CACHE_TTL: u64 = 604800; // 1 week
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl OmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url,
            cache,
        })
    }

    fn query_params<'a>(&'a self, title: &'a str, year: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![("apikey", self.api_key.as_str()), ("t", title), ("plot", "short")];
        if !year.is_empty() {
            params.push(("y", year));
        }
        params
    }
}

#[async_trait::async_trait]
impl RatingsProvider for OmdbProvider {
    async fn lookup(&self, title: &str, year: Option<i32>) -> AppResult<Option<Enrichment>> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        cached!(
            self.cache,
            CacheKey::Ratings {
                title: title.to_string(),
                year,
            },
            RATINGS_CACHE_TTL,
            async move {
                let year = year.map(|y| y.to_string()).unwrap_or_default();
                let response = self
                    .http_client
                    .get(&self.api_url)
                    .query(&self.query_params(title, &year))
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::ExternalApi(format!(
                        "OMDb API returned status {}",
                        status
                    )));
                }

                let body: OmdbResponse = response.json().await?;
                if let Some(error) = body.error.as_deref() {
                    tracing::debug!(title = %title, error = %error, "OMDb lookup found nothing");
                }

                Ok::<_, AppError>(body.into_enrichment())
            }
        )
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
