use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{profiles::validate_user_id, AppState};
use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{GeneratedTasteProfile, StoredTasteProfile, TasteProfile, UserTaste},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfileResponse {
    pub taste_profile: Option<StoredTasteProfile>,
}

/// Writes a taste profile from submitted interests without storing it
pub async fn generate_taste_profile(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(taste): Json<UserTaste>,
) -> AppResult<Json<GeneratedTasteProfile>> {
    let generated = state.taste_profiles.generate(&taste).await?;
    tracing::info!(request_id = %request_id, source = ?generated.source, "Taste profile generated");
    Ok(Json(generated))
}

pub async fn save_taste_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(profile): Json<TasteProfile>,
) -> AppResult<Json<StoredTasteProfile>> {
    let user_id = validate_user_id(&user_id)?;
    if !profile.is_complete() {
        return Err(AppError::InvalidInput(
            "headline, description, vibe and compatibility are required".to_string(),
        ));
    }

    let stored = state.repository.save_taste_profile(user_id, profile).await?;
    tracing::info!(user_id = %user_id, "Taste profile saved");
    Ok(Json(stored))
}

pub async fn get_taste_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<TasteProfileResponse>> {
    let user_id = validate_user_id(&user_id)?;
    let taste_profile = state.repository.load_taste_profile(user_id).await?;
    Ok(Json(TasteProfileResponse { taste_profile }))
}
