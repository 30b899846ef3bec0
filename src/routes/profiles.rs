use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{ProfileUpsert, StoredProfile},
};

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

pub(super) fn validate_user_id(user_id: &str) -> AppResult<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("User ID is required".to_string()));
    }
    Ok(user_id)
}

/// Creates or replaces a profile and marks it complete
pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(profile): Json<ProfileUpsert>,
) -> AppResult<Json<StoredProfile>> {
    let user_id = validate_user_id(&user_id)?;
    let stored = state.repository.save_profile(user_id, profile).await?;
    tracing::info!(user_id = %user_id, "Profile saved");
    Ok(Json(stored))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<StoredProfile>> {
    let user_id = validate_user_id(&user_id)?;
    state
        .repository
        .load_profile(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
}

pub async fn user_exists(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ExistsResponse>> {
    let user_id = validate_user_id(&user_id)?;
    let exists = state.repository.load_profile(user_id).await?.is_some();
    Ok(Json(ExistsResponse { exists }))
}
