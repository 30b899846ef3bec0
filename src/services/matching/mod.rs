//! Taste-based matching engine
//!
//! Pure computation over data already loaded from storage: build taste vectors,
//! score every candidate with weighted Jaccard similarity, then rank.

pub mod aggregator;
pub mod ranker;
pub mod similarity;
pub mod taste_vector;

use std::collections::HashMap;
use std::time::Instant;

use crate::{
    db::TasteRepository,
    error::{AppError, AppResult},
    models::{CandidateRecord, DisplayProfile, FindMatchesResponse, MatchResult, UserTaste},
};

pub use aggregator::score_candidate;
pub use ranker::rank;
pub use taste_vector::TasteVector;

/// Everything one matching run produced, kept for downstream explanation
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub user_taste: UserTaste,
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    /// Display profiles of the ranked candidates only
    pub profiles: HashMap<String, DisplayProfile>,
}

impl From<MatchReport> for FindMatchesResponse {
    fn from(report: MatchReport) -> Self {
        Self {
            matches: report.matches,
            total_candidates: report.total_candidates,
        }
    }
}

/// Scores and ranks a candidate pool against one user's taste
pub fn match_candidates(user_taste: &UserTaste, candidates: &[CandidateRecord]) -> Vec<MatchResult> {
    let user_vector = TasteVector::from_taste(user_taste);
    if user_vector.is_empty() {
        return Vec::new();
    }

    let scored: Vec<MatchResult> = candidates
        .iter()
        .filter_map(|candidate| {
            let candidate_vector = TasteVector::from_taste(&candidate.taste);
            score_candidate(&user_vector, &candidate_vector, &candidate.user_id)
        })
        .collect();

    rank(scored)
}

/// Loads the user and candidate pool from storage and runs the matching engine
pub async fn run_matching(repository: &dyn TasteRepository, user_id: &str) -> AppResult<MatchReport> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("User ID is required".to_string()));
    }

    let start = Instant::now();

    let user_taste = repository
        .load_user_taste(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    let candidates = repository.load_candidate_pool(user_id).await?;
    let total_candidates = candidates.len();

    let matches = match_candidates(&user_taste, &candidates);

    let mut profiles: HashMap<String, DisplayProfile> = candidates
        .into_iter()
        .map(|c| (c.user_id, c.display_profile))
        .collect();
    profiles.retain(|id, _| matches.iter().any(|m| &m.candidate_user_id == id));

    tracing::info!(
        user_id = %user_id,
        total_candidates,
        matched = matches.len(),
        top_score = matches.first().map(|m| m.match_score),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Matching completed"
    );

    Ok(MatchReport {
        user_taste,
        matches,
        total_candidates,
        profiles,
    })
}

/// Finds the users most compatible with `user_id`
pub async fn find_matches(
    repository: &dyn TasteRepository,
    user_id: &str,
) -> AppResult<FindMatchesResponse> {
    Ok(run_matching(repository, user_id).await?.into())
}
