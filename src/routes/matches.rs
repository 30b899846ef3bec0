use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;
use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{ExplainedMatchesResponse, FindMatchesRequest, FindMatchesResponse},
    services::matching,
};

/// Ranked matches for one user
pub async fn find_matches(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<FindMatchesRequest>,
) -> AppResult<Json<FindMatchesResponse>> {
    tracing::info!(request_id = %request_id, user_id = %request.user_id, "Finding matches");
    let response = matching::find_matches(state.repository.as_ref(), &request.user_id).await?;
    Ok(Json(response))
}

/// Ranked matches for one user, each with a generated explanation
pub async fn find_explained_matches(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<FindMatchesRequest>,
) -> AppResult<Json<ExplainedMatchesResponse>> {
    tracing::info!(request_id = %request_id, user_id = %request.user_id, "Finding explained matches");
    let report = matching::run_matching(state.repository.as_ref(), &request.user_id).await?;
    let response = state
        .explainer
        .explain_report(request.user_id.trim(), report)
        .await;
    Ok(Json(response))
}
