use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, DisplayProfile};

/// Compatibility of one candidate with the querying user
///
/// `total_shared_items` counts the capped samples in `shared_entities`, not the
/// full intersection, so it is a lower bound on the real overlap for categories
/// with more than five shared tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub candidate_user_id: String,
    /// Final score in [0, 1], bonuses included
    pub match_score: f64,
    /// Weighted Jaccard average before bonuses
    #[serde(skip)]
    pub base_score: f64,
    pub shared_fields: Vec<Category>,
    pub shared_entities: BTreeMap<Category, Vec<String>>,
    pub total_shared_items: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Where an explanation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSource {
    Generated,
    Cached,
    Fallback,
}

/// Human-readable compatibility blurb with short tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub tags: Vec<String>,
    pub source: ExplanationSource,
}

/// A ranked match together with its display profile and explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainedMatch {
    #[serde(flatten)]
    pub result: MatchResult,
    pub candidate: DisplayProfile,
    pub explanation: Explanation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainedMatchesResponse {
    pub matches: Vec<ExplainedMatch>,
    pub total_candidates: usize,
}
