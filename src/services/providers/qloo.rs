/// Qloo taste-graph provider
///
/// `/search` turns free text into entity IDs; `/v2/insights` looks up entities
/// related to a seed entity, filtered to one category. Both are cached in Redis
/// since the graph changes slowly.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Category, InsightItem, SearchEntity},
    services::providers::EnrichmentProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const INSIGHTS_CACHE_TTL: u64 = 3600; // 1 hour
const SEARCH_CACHE_TTL: u64 = 3600;

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    #[serde(default)]
    results: Option<InsightsResults>,
}

#[derive(Debug, Deserialize)]
struct InsightsResults {
    #[serde(default)]
    entities: Vec<QlooEntity>,
}

#[derive(Debug, Deserialize)]
struct QlooEntity {
    entity_id: String,
    name: String,
    #[serde(default)]
    popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<QlooSearchHit>,
}

#[derive(Debug, Deserialize)]
struct QlooSearchHit {
    entity_id: String,
    name: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    popularity: Option<f64>,
}

impl From<QlooSearchHit> for SearchEntity {
    fn from(hit: QlooSearchHit) -> Self {
        SearchEntity {
            entity_id: hit.entity_id,
            name: hit.name,
            types: hit.types,
            popularity: hit.popularity,
        }
    }
}

impl From<QlooEntity> for InsightItem {
    fn from(entity: QlooEntity) -> Self {
        InsightItem {
            entity_id: entity.entity_id,
            name: entity.name,
            popularity: entity.popularity,
        }
    }
}

#[derive(Clone)]
pub struct QlooProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl QlooProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch_from_api(
        &self,
        entity_id: &str,
        filter: Category,
        take: u32,
    ) -> AppResult<Vec<InsightItem>> {
        let url = format!("{}/v2/insights", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("accept", "application/json")
            .query(&[
                ("filter.type", filter.qloo_urn()),
                ("signal.interests.entities", entity_id.to_string()),
                ("take", take.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Qloo API returned status {}: {}",
                status, body
            )));
        }

        let insights: InsightsResponse = response.json().await?;
        let items: Vec<InsightItem> = insights
            .results
            .map(|r| r.entities)
            .unwrap_or_default()
            .into_iter()
            .map(InsightItem::from)
            .collect();

        tracing::info!(
            entity_id = %entity_id,
            filter = %filter,
            results = items.len(),
            provider = "qloo",
            "Insights fetched"
        );

        Ok(items)
    }

    async fn search_api(&self, query: &str, take: u32) -> AppResult<Vec<SearchEntity>> {
        let url = format!("{}/search", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("accept", "application/json")
            .query(&[
                ("query", query.to_string()),
                ("take", take.to_string()),
                ("page", "1".to_string()),
                ("sort_by", "match".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Qloo search returned status {}: {}",
                status, body
            )));
        }

        let found: SearchResponse = response.json().await?;
        let entities: Vec<SearchEntity> = found.results.into_iter().map(SearchEntity::from).collect();

        tracing::info!(
            query = %query,
            results = entities.len(),
            provider = "qloo",
            "Entity search completed"
        );

        Ok(entities)
    }
}

#[async_trait::async_trait]
impl EnrichmentProvider for QlooProvider {
    async fn fetch_insights(
        &self,
        entity_id: &str,
        filter: Category,
        take: u32,
    ) -> AppResult<Vec<InsightItem>> {
        if entity_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Entity ID cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::Insights {
                entity_id: entity_id.to_string(),
                filter,
                take,
            },
            INSIGHTS_CACHE_TTL,
            self.fetch_from_api(entity_id, filter, take)
        )
    }

    async fn search(&self, query: &str, take: u32) -> AppResult<Vec<SearchEntity>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::search(query, take),
            SEARCH_CACHE_TTL,
            self.search_api(query, take)
        )
    }

    fn name(&self) -> &'static str {
        "qloo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    fn create_test_provider(api_url: &str) -> QlooProvider {
        // Only used for URL parsing; tests below bypass the cache.
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client);
        QlooProvider::new(cache, "test_key".to_string(), api_url.to_string())
    }

    #[test]
    fn test_insights_response_deserialization() {
        let json = r#"{
            "success": true,
            "results": {
                "entities": [
                    {"entity_id": "B8B2BDC1-ADA7", "name": "Kendrick Lamar", "popularity": 0.97, "types": ["urn:entity:artist"]},
                    {"entity_id": "C1D2", "name": "SZA"}
                ]
            }
        }"#;

        let response: InsightsResponse = serde_json::from_str(json).unwrap();
        let items: Vec<InsightItem> = response
            .results
            .unwrap()
            .entities
            .into_iter()
            .map(InsightItem::from)
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].entity_id, "B8B2BDC1-ADA7");
        assert_eq!(items[0].popularity, Some(0.97));
        assert_eq!(items[1].popularity, None);
    }

    #[test]
    fn test_insights_response_without_results() {
        let response: InsightsResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(response.results.is_none());
    }

    #[tokio::test]
    async fn test_fetch_from_api_sends_filters() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/v2/insights"))
            .and(wiremock::matchers::header("X-Api-Key", "test_key"))
            .and(wiremock::matchers::query_param("filter.type", "urn:entity:artist"))
            .and(wiremock::matchers::query_param("signal.interests.entities", "E-DRAKE"))
            .and(wiremock::matchers::query_param("take", "5"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": {"entities": [{"entity_id": "E-SZA", "name": "SZA", "popularity": 0.9}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let items = provider
            .fetch_from_api("E-DRAKE", Category::Artist, 5)
            .await
            .unwrap();

        assert_eq!(
            items,
            vec![InsightItem {
                entity_id: "E-SZA".to_string(),
                name: "SZA".to_string(),
                popularity: Some(0.9),
            }]
        );
    }

    #[tokio::test]
    async fn test_fetch_from_api_error_status() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let result = provider.fetch_from_api("E-DRAKE", Category::Artist, 5).await;

        assert!(matches!(result, Err(AppError::ExternalApi(msg)) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_search_api_sends_query() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/search"))
            .and(wiremock::matchers::header("X-Api-Key", "test_key"))
            .and(wiremock::matchers::query_param("query", "kendrick"))
            .and(wiremock::matchers::query_param("take", "20"))
            .and(wiremock::matchers::query_param("sort_by", "match"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"entity_id": "E-KL", "name": "Kendrick Lamar", "types": ["urn:entity:artist"], "popularity": 0.99},
                    {"entity_id": "E-KP", "name": "Kendrick Perkins"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let entities = provider.search_api("kendrick", 20).await.unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_id, "E-KL");
        assert_eq!(entities[0].types, vec!["urn:entity:artist".to_string()]);
        assert!(entities[1].types.is_empty());
    }

    #[tokio::test]
    async fn test_search_api_error_status() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/search"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = create_test_provider(&server.uri());
        let result = provider.search_api("kendrick", 20).await;

        assert!(matches!(result, Err(AppError::ExternalApi(msg)) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let provider = create_test_provider("http://test.local");
        let result = provider.search(" \t", 20).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_fetch_insights_rejects_blank_entity() {
        let provider = create_test_provider("http://test.local");
        let result = provider.fetch_insights("  ", Category::Movie, 10).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
