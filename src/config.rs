use chrono::{Datelike, Utc};
use serde::Deserialize;
use std::{collections::HashSet, time::Duration};

use crate::services::{
    admission::{AdmissionPolicy, DEFAULT_EXCLUDED_GENRES, DEFAULT_MIN_RATING},
    formatting::NotificationFormatter,
    monitor::MonitorSettings,
    patterns::{TitleClassifier, DEFAULT_FRANCHISE_PATTERNS, DEFAULT_SEQUEL_TOKENS},
    ranking::RankingEngine,
    scoring::{Scorer, ScoringWeights, DEFAULT_HIGH_ATTENTION_GENRES, DEFAULT_MAINSTREAM_GENRES},
};

/// Application configuration loaded from environment variables
///
/// List-valued options are comma separated (`EXCLUDED_GENRES=Drama,Comedy`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,

    /// Destination chat for notifications
    pub chat_id: String,

    /// OMDb API key; enrichment is skipped when unset
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    #[serde(default = "default_yts_api_url")]
    pub yts_api_url: String,

    /// Public site used for links in notifications
    #[serde(default = "default_yts_site_url")]
    pub yts_site_url: String,

    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Wait after a failed cycle before the next attempt
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Pause between consecutive notifications
    #[serde(default = "default_notification_delay_ms")]
    pub notification_delay_ms: u64,

    #[serde(default = "default_max_movies_per_check")]
    pub max_movies_per_check: u32,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Titles searched for on every poll in addition to the latest listings
    #[serde(default = "default_watch_queries")]
    pub watch_queries: Vec<String>,

    #[serde(default = "default_min_rating")]
    pub min_rating: f64,

    /// Defaults to the current year at startup
    #[serde(default)]
    pub min_year: Option<i32>,

    #[serde(default = "default_excluded_genres")]
    pub excluded_genres: Vec<String>,

    #[serde(default = "default_high_attention_genres")]
    pub high_attention_genres: Vec<String>,

    #[serde(default = "default_mainstream_genres")]
    pub mainstream_genres: Vec<String>,

    /// Sequel markers; prefix a token with `=` to match whole words only
    #[serde(default = "default_sequel_tokens")]
    pub sequel_tokens: Vec<String>,

    #[serde(default = "default_franchise_patterns")]
    pub franchise_patterns: Vec<String>,

    #[serde(default = "default_rating_weight")]
    pub rating_weight: f64,

    /// Release-year bonus by years before the current year, newest first
    #[serde(default = "default_release_year_bonuses")]
    pub release_year_bonuses: Vec<f64>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_yts_api_url() -> String {
    "https://yts.mx/api/v2".to_string()
}

fn default_yts_site_url() -> String {
    "https://yts.mx".to_string()
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_check_interval_secs() -> u64 {
    3600
}

fn default_retry_delay_secs() -> u64 {
    60
}

fn default_notification_delay_ms() -> u64 {
    2000
}

fn default_max_movies_per_check() -> u32 {
    100
}

fn default_search_limit() -> u32 {
    50
}

fn default_max_search_results() -> usize {
    10
}

fn default_watch_queries() -> Vec<String> {
    strings(&["28 Years Later"])
}

fn default_min_rating() -> f64 {
    DEFAULT_MIN_RATING
}

fn default_excluded_genres() -> Vec<String> {
    strings(DEFAULT_EXCLUDED_GENRES)
}

fn default_high_attention_genres() -> Vec<String> {
    strings(DEFAULT_HIGH_ATTENTION_GENRES)
}

fn default_mainstream_genres() -> Vec<String> {
    strings(DEFAULT_MAINSTREAM_GENRES)
}

fn default_sequel_tokens() -> Vec<String> {
    strings(DEFAULT_SEQUEL_TOKENS)
}

fn default_franchise_patterns() -> Vec<String> {
    strings(DEFAULT_FRANCHISE_PATTERNS)
}

fn default_rating_weight() -> f64 {
    ScoringWeights::default().rating_weight
}

fn default_release_year_bonuses() -> Vec<f64> {
    ScoringWeights::default().release_year_bonuses
}

fn label_set(labels: &[String]) -> HashSet<String> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn admission_policy(&self, current_year: i32) -> AdmissionPolicy {
        AdmissionPolicy {
            min_rating: self.min_rating,
            min_year: self.min_year.unwrap_or(current_year),
            excluded_genres: label_set(&self.excluded_genres),
        }
    }

    pub fn scorer(&self) -> Scorer {
        let weights = ScoringWeights {
            rating_weight: self.rating_weight,
            release_year_bonuses: self.release_year_bonuses.clone(),
            ..ScoringWeights::default()
        };

        Scorer::new(
            weights,
            label_set(&self.high_attention_genres),
            label_set(&self.mainstream_genres),
            TitleClassifier::from_tokens(
                self.sequel_tokens.as_slice(),
                self.franchise_patterns.as_slice(),
            ),
        )
    }

    /// Ranking engine with the current year taken from the system clock
    pub fn ranking_engine(&self) -> RankingEngine {
        RankingEngine::new(self.admission_policy(Utc::now().year()), self.scorer())
    }

    pub fn formatter(&self) -> NotificationFormatter {
        NotificationFormatter::new(
            TitleClassifier::from_tokens(
                self.sequel_tokens.as_slice(),
                self.franchise_patterns.as_slice(),
            ),
            self.yts_site_url.clone(),
        )
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            latest_limit: self.max_movies_per_check,
            search_limit: self.search_limit,
            max_search_results: self.max_search_results,
            watch_queries: self
                .watch_queries
                .iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect(),
            check_interval: self.check_interval(),
            retry_delay: self.retry_delay(),
            notification_delay: self.notification_delay(),
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.notification_delay_ms)
    }
}
