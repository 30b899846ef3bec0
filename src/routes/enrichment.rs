use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{Category, InsightItem, SearchEntity},
    services::providers::EnrichmentProvider,
};

const DEFAULT_INSIGHTS_TAKE: u32 = 10;
const DEFAULT_SEARCH_TAKE: u32 = 20;
const MAX_TAKE: u32 = 50;

fn provider(state: &AppState) -> AppResult<&dyn EnrichmentProvider> {
    state
        .enrichment
        .as_deref()
        .ok_or_else(|| AppError::ExternalApi("Enrichment provider not configured".to_string()))
}

fn validate_take(take: Option<u32>, default: u32) -> AppResult<u32> {
    let take = take.unwrap_or(default);
    if !(1..=MAX_TAKE).contains(&take) {
        return Err(AppError::InvalidInput(format!(
            "take must be between 1 and {}",
            MAX_TAKE
        )));
    }
    Ok(take)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub entity_id: String,
    pub filter: String,
    #[serde(default)]
    pub take: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub entity_id: String,
    pub filter: Category,
    pub items: Vec<InsightItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub take: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchEntity>,
}

/// Entities related to a seed entity within one category
pub async fn fetch_insights(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InsightsRequest>,
) -> AppResult<Json<InsightsResponse>> {
    let provider = provider(&state)?;

    let filter = request
        .filter
        .parse::<Category>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let take = validate_take(request.take, DEFAULT_INSIGHTS_TAKE)?;

    let entity_id = request.entity_id.trim();
    let items = provider.fetch_insights(entity_id, filter, take).await?;

    Ok(Json(InsightsResponse {
        entity_id: entity_id.to_string(),
        filter,
        items,
    }))
}

/// Free-text entity search, used to find the IDs insights lookups need
pub async fn search_entities(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let provider = provider(&state)?;
    let take = validate_take(request.take, DEFAULT_SEARCH_TAKE)?;

    let query = request.query.trim();
    let results = provider.search(query, take).await?;

    Ok(Json(SearchResponse {
        query: query.to_string(),
        results,
    }))
}
