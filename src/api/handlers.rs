use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntry, ScoredEntry};
use crate::services::CycleReport;

use super::AppState;

const DEFAULT_LATEST_LIMIT: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Markdown rendering as sent to the chat
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NoveltyResponse {
    pub seen: usize,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// On-demand title search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchResult>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let formatter = state.monitor.formatter();
    let results = state
        .monitor
        .search(&params.q)
        .await?
        .into_iter()
        .map(|entry| SearchResult {
            message: formatter.search_result(&entry),
            entry,
        })
        .collect();

    Ok(Json(results))
}

/// Latest admitted listings in priority order
pub async fn latest(
    State(state): State<AppState>,
    Query(params): Query<LatestQuery>,
) -> AppResult<Json<Vec<ScoredEntry>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    if limit == 0 {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }

    let ranked = state.monitor.whats_new(Utc::now(), limit).await?;
    Ok(Json(ranked))
}

/// Runs a polling cycle immediately
pub async fn check_now(State(state): State<AppState>) -> AppResult<Json<CycleReport>> {
    let report = state.monitor.run_cycle(Utc::now()).await?;
    Ok(Json(report))
}

/// Number of identifiers already notified
pub async fn novelty(State(state): State<AppState>) -> Json<NoveltyResponse> {
    Json(NoveltyResponse {
        seen: state.monitor.tracker().seen_count().await,
    })
}
