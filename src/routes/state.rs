use std::sync::Arc;

use crate::{
    db::TasteRepository,
    services::{
        explainer::MatchExplainer,
        providers::{EnrichmentProvider, TextGenerator},
        taste_profile::TasteProfileGenerator,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn TasteRepository>,
    pub explainer: MatchExplainer,
    pub taste_profiles: TasteProfileGenerator,
    /// Absent when no taste-graph API key is configured
    pub enrichment: Option<Arc<dyn EnrichmentProvider>>,
}

impl AppState {
    /// Explanations and taste profiles share one text generator
    pub fn new(
        repository: Arc<dyn TasteRepository>,
        generator: Arc<dyn TextGenerator>,
        explainer: MatchExplainer,
    ) -> Self {
        Self {
            repository,
            explainer,
            taste_profiles: TasteProfileGenerator::new(generator),
            enrichment: None,
        }
    }

    pub fn with_enrichment(mut self, provider: Arc<dyn EnrichmentProvider>) -> Self {
        self.enrichment = Some(provider);
        self
    }
}
