use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Category, UserTaste};

/// Normalized per-category token sets for one user
///
/// A category is either absent or holds at least one token; empty sets are never
/// stored, so two users missing the same category cannot look alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasteVector {
    categories: BTreeMap<Category, BTreeSet<String>>,
}

impl TasteVector {
    /// Builds the vector from stored interests and enrichment entities
    ///
    /// Interests are trimmed and case-folded. Each entity contributes its id as-is
    /// and its case-folded name. Unknown categories and blank tokens are skipped.
    pub fn from_taste(taste: &UserTaste) -> Self {
        let mut vector = Self::default();

        for (raw_category, interests) in &taste.interests {
            let Some(category) = parse_category(raw_category) else {
                continue;
            };
            for interest in interests {
                vector.insert(category, &interest.to_lowercase());
            }
        }

        for (raw_category, entities) in &taste.enrichment {
            let Some(category) = parse_category(raw_category) else {
                continue;
            };
            for entity in entities {
                vector.insert(category, &entity.entity_id);
                vector.insert(category, &entity.name.to_lowercase());
            }
        }

        vector
    }

    fn insert(&mut self, category: Category, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        self.categories
            .entry(category)
            .or_default()
            .insert(token.to_string());
    }

    /// Tokens for a category, `None` when the user has nothing there
    pub fn tokens(&self, category: Category) -> Option<&BTreeSet<String>> {
        self.categories.get(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn parse_category(raw: &str) -> Option<Category> {
    match raw.parse() {
        Ok(category) => Some(category),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring taste data for unknown category");
            None
        }
    }
}
