use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taste_match_api::{
    config::Config,
    db::{create_pool, create_redis_client, redis::RedisExplanationCache, Cache, PgTasteRepository},
    routes::{create_router, AppState},
    services::{
        explainer::MatchExplainer,
        providers::{openai::OpenAiGenerator, qloo::QlooProvider, ExplanationCache, TextGenerator},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taste_match_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client);

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::new(
        &config.openai_api_key,
        &config.openai_api_url,
        &config.openai_model,
        config.text_gen_retry(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create text generator: {}", e))?);

    let explanation_cache: Arc<dyn ExplanationCache> = Arc::new(RedisExplanationCache::new(
        cache.clone(),
        config.explanation_cache_ttl,
    ));
    let explainer = MatchExplainer::new(generator.clone(), Some(explanation_cache));

    let mut state = AppState::new(
        Arc::new(PgTasteRepository::new(pool)),
        generator,
        explainer,
    );
    match &config.qloo_api_key {
        Some(api_key) => {
            state = state.with_enrichment(Arc::new(QlooProvider::new(
                cache.clone(),
                api_key.clone(),
                config.qloo_api_url.clone(),
            )));
        }
        None => tracing::warn!("QLOO_API_KEY not set, enrichment lookups disabled"),
    }

    let app = create_router(Arc::new(state));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flushing pending cache writes");
    cache_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
