use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    models::{
        DisplayProfile, ExplainedMatch, ExplainedMatchesResponse, Explanation, ExplanationSource,
        MatchResult,
    },
    services::{
        matching::MatchReport,
        providers::{ExplanationCache, ExplanationRequest, TextGenerator},
    },
};

pub const FALLBACK_TEXT: &str =
    "You share amazing taste and similar interests - this looks like a great potential connection!";
pub const FALLBACK_TAGS: [&str; 2] = ["Similar Tastes", "Good Match"];

/// Explanation used whenever generation fails
pub fn fallback_explanation() -> Explanation {
    Explanation {
        text: FALLBACK_TEXT.to_string(),
        tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
        source: ExplanationSource::Fallback,
    }
}

/// Turns match results into human-readable explanations
///
/// Never fails: cache errors are ignored and generator errors degrade to
/// [`fallback_explanation`].
#[derive(Clone)]
pub struct MatchExplainer {
    generator: Arc<dyn TextGenerator>,
    cache: Option<Arc<dyn ExplanationCache>>,
}

impl MatchExplainer {
    pub fn new(generator: Arc<dyn TextGenerator>, cache: Option<Arc<dyn ExplanationCache>>) -> Self {
        Self { generator, cache }
    }

    /// Explains one match between `user_id` and the result's candidate
    pub async fn explain(
        &self,
        user_id: &str,
        user_interests: &BTreeMap<String, Vec<String>>,
        result: &MatchResult,
        candidate: &DisplayProfile,
    ) -> Explanation {
        let candidate_id = result.candidate_user_id.as_str();

        if let Some(cache) = &self.cache {
            match cache.get(user_id, candidate_id).await {
                Ok(Some(mut cached)) => {
                    tracing::debug!(user_id = %user_id, candidate_id = %candidate_id, "Explanation cache hit");
                    cached.source = ExplanationSource::Cached;
                    return cached;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Explanation cache read failed");
                }
            }
        }

        let request = ExplanationRequest {
            user_interests: user_interests.clone(),
            shared_entities: result.shared_entities.clone(),
            candidate: candidate.clone(),
            match_score: result.match_score,
        };

        let generated = match self.generator.generate_explanation(&request).await {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.generator.name(),
                    user_id = %user_id,
                    candidate_id = %candidate_id,
                    "Explanation generation failed, using fallback"
                );
                return fallback_explanation();
            }
        };

        let tags = if generated.tags.is_empty() {
            FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
        } else {
            generated.tags
        };
        let explanation = Explanation {
            text: generated.text,
            tags,
            source: ExplanationSource::Generated,
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(user_id, candidate_id, &explanation).await {
                tracing::warn!(error = %e, "Explanation cache write failed");
            }
        }

        explanation
    }

    /// Explains every match concurrently, preserving input order
    pub async fn explain_all(
        &self,
        user_id: &str,
        user_interests: BTreeMap<String, Vec<String>>,
        matches: Vec<(MatchResult, DisplayProfile)>,
    ) -> Vec<ExplainedMatch> {
        let user_interests = Arc::new(user_interests);

        let tasks: Vec<_> = matches
            .iter()
            .map(|(result, candidate)| {
                let explainer = self.clone();
                let user_id = user_id.to_string();
                let user_interests = user_interests.clone();
                let result = result.clone();
                let candidate = candidate.clone();
                tokio::spawn(async move {
                    explainer
                        .explain(&user_id, &user_interests, &result, &candidate)
                        .await
                })
            })
            .collect();

        let mut explained = Vec::with_capacity(matches.len());
        for ((result, candidate), task) in matches.into_iter().zip(tasks) {
            let explanation = match task.await {
                Ok(explanation) => explanation,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        candidate_id = %result.candidate_user_id,
                        "Explanation task failed"
                    );
                    fallback_explanation()
                }
            };
            explained.push(ExplainedMatch {
                result,
                candidate,
                explanation,
            });
        }

        explained
    }

    /// Explains the ranked matches of a matching run
    pub async fn explain_report(&self, user_id: &str, report: MatchReport) -> ExplainedMatchesResponse {
        let MatchReport {
            user_taste,
            matches,
            total_candidates,
            mut profiles,
        } = report;

        let user_interests: BTreeMap<String, Vec<String>> = user_taste.interests.into_iter().collect();
        let pairs = matches
            .into_iter()
            .map(|result| {
                let candidate = profiles.remove(&result.candidate_user_id).unwrap_or_else(|| {
                    DisplayProfile::with_placeholders(&result.candidate_user_id, None, None, None)
                });
                (result, candidate)
            })
            .collect();

        ExplainedMatchesResponse {
            matches: self.explain_all(user_id, user_interests, pairs).await,
            total_candidates,
        }
    }
}
