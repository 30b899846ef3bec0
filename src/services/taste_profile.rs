//! Taste-profile generation
//!
//! Summarizes a user's interests into a headline, vibe and traits. Never fails
//! once the input is valid: unparsable model output and unreachable generators
//! each map to their own canned profile.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{GeneratedTasteProfile, TasteProfile, TasteProfileSource, UserTaste},
    services::providers::{GenerationError, TasteProfileRequest, TextGenerator},
};

#[derive(Clone)]
pub struct TasteProfileGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl TasteProfileGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Writes a taste profile for the given interests
    ///
    /// Returns `InvalidInput` when there is not a single non-blank interest.
    pub async fn generate(&self, taste: &UserTaste) -> AppResult<GeneratedTasteProfile> {
        let request = TasteProfileRequest {
            interests: taste
                .interests
                .iter()
                .map(|(category, values)| {
                    let values = values
                        .iter()
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .map(String::from)
                        .collect();
                    (category.clone(), values)
                })
                .collect(),
            insights: taste
                .enrichment
                .iter()
                .map(|(category, items)| (category.clone(), items.clone()))
                .collect(),
        };

        if request.interests.values().all(|values| values.is_empty()) {
            return Err(AppError::InvalidInput(
                "Interests data is required".to_string(),
            ));
        }

        match self.generator.generate_taste_profile(&request).await {
            Ok(profile) => Ok(GeneratedTasteProfile {
                profile,
                source: TasteProfileSource::Generated,
            }),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.generator.name(),
                    "Taste profile generation failed, using fallback"
                );
                let profile = match e {
                    GenerationError::InvalidResponse(_) => TasteProfile::unparsed_fallback(),
                    _ => TasteProfile::unavailable_fallback(),
                };
                Ok(GeneratedTasteProfile {
                    profile,
                    source: TasteProfileSource::Fallback,
                })
            }
        }
    }
}
