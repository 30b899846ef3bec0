use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{assign_request_id, request_span};

pub mod enrichment;
pub mod matches;
pub mod profiles;
pub mod taste_profiles;
mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(assign_request_id))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matches", post(matches::find_matches))
        .route("/matches/explained", post(matches::find_explained_matches))
        .route(
            "/profiles/:user_id",
            put(profiles::save_profile).get(profiles::get_profile),
        )
        .route(
            "/profiles/:user_id/taste-profile",
            put(taste_profiles::save_taste_profile).get(taste_profiles::get_taste_profile),
        )
        .route("/users/:user_id/exists", get(profiles::user_exists))
        .route("/taste-profiles", post(taste_profiles::generate_taste_profile))
        .route("/insights", post(enrichment::fetch_insights))
        .route("/search", post(enrichment::search_entities))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
