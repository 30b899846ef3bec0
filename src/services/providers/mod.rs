//! External collaborator abstractions
//!
//! The matching engine talks to three outside services: a text generator for
//! compatibility blurbs and taste profiles, an optional cache for those blurbs, and
//! the taste-graph enrichment API. Each sits behind a trait so implementations can be swapped
//! or mocked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{Category, DisplayProfile, Explanation, InsightItem, SearchEntity, TasteProfile},
};

pub mod openai;
pub mod qloo;

/// Input for one compatibility explanation
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationRequest {
    /// Querying user's raw interests, for prompt context
    pub user_interests: BTreeMap<String, Vec<String>>,
    pub shared_entities: BTreeMap<Category, Vec<String>>,
    pub candidate: DisplayProfile,
    pub match_score: f64,
}

/// Input for one taste-profile summary
#[derive(Debug, Clone, PartialEq)]
pub struct TasteProfileRequest {
    pub interests: BTreeMap<String, Vec<String>>,
    pub insights: BTreeMap<String, Vec<InsightItem>>,
}

/// Text generator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExplanation {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Text generation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Rate limits, timeouts, network errors and 5xx responses are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::RateLimited { .. }
            | GenerationError::Timeout
            | GenerationError::Network(_) => true,
            GenerationError::Api { status, .. } => *status >= 500 || *status == 429,
            GenerationError::InvalidResponse(_) | GenerationError::Exhausted { .. } => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else if e.is_decode() {
            GenerationError::InvalidResponse(e.to_string())
        } else {
            GenerationError::Network(e.to_string())
        }
    }
}

/// Produces natural-language compatibility explanations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_explanation(
        &self,
        request: &ExplanationRequest,
    ) -> Result<GeneratedExplanation, GenerationError>;

    async fn generate_taste_profile(
        &self,
        request: &TasteProfileRequest,
    ) -> Result<TasteProfile, GenerationError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Best-effort store of explanations keyed by an unordered user pair
///
/// `get(a, b)` and `get(b, a)` read the same entry. Blurbs are written from the
/// side of whichever user first asked ("you" is that user, the other is named),
/// and the stored copy is served unchanged to the other side.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExplanationCache: Send + Sync {
    async fn get(&self, user_a: &str, user_b: &str) -> AppResult<Option<Explanation>>;

    async fn put(&self, user_a: &str, user_b: &str, explanation: &Explanation) -> AppResult<()>;
}

/// Taste-graph lookups used to enrich raw interests
#[async_trait::async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Entities related to `entity_id`, restricted to one category
    async fn fetch_insights(
        &self,
        entity_id: &str,
        filter: Category,
        take: u32,
    ) -> AppResult<Vec<InsightItem>>;

    /// Free-text entity search, best match first
    async fn search(&self, query: &str, take: u32) -> AppResult<Vec<SearchEntity>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(GenerationError::RateLimited { retry_after: None }.is_retryable());
        assert!(GenerationError::Timeout.is_retryable());
        assert!(GenerationError::Network("reset".to_string()).is_retryable());
        assert!(GenerationError::Api {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!GenerationError::Api {
            status: 401,
            message: "bad key".to_string()
        }
        .is_retryable());
        assert!(!GenerationError::InvalidResponse("no json".to_string()).is_retryable());
        assert!(!GenerationError::Exhausted {
            attempts: 3,
            last: Box::new(GenerationError::Timeout)
        }
        .is_retryable());
    }

    #[test]
    fn test_generated_explanation_tags_default() {
        let parsed: GeneratedExplanation =
            serde_json::from_str(r#"{"text": "You both love Drake."}"#).unwrap();
        assert!(parsed.tags.is_empty());
    }
}
