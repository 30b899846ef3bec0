use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::TasteRepository;
use crate::{
    error::{AppError, AppResult},
    models::{
        CandidateRecord, DisplayProfile, ProfileUpsert, StoredProfile, StoredTasteProfile,
        TasteProfile, UserTaste,
    },
};

/// In-process taste repository, used for local runs and tests
#[derive(Clone, Default)]
pub struct InMemoryTasteRepository {
    profiles: Arc<RwLock<HashMap<String, StoredProfile>>>,
    taste_profiles: Arc<RwLock<HashMap<String, StoredTasteProfile>>>,
}

impl InMemoryTasteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a profile directly, with an explicit completion flag
    pub async fn insert(&self, user_id: &str, taste: UserTaste, profile_completed: bool) {
        let profile = StoredProfile {
            user_id: user_id.to_string(),
            taste,
            display_profile: DisplayProfile::with_placeholders(user_id, None, None, None),
            profile_completed,
            updated_at: Utc::now(),
        };
        self.profiles
            .write()
            .await
            .insert(user_id.to_string(), profile);
    }
}

#[async_trait::async_trait]
impl TasteRepository for InMemoryTasteRepository {
    async fn load_user_taste(&self, user_id: &str) -> AppResult<Option<UserTaste>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user_id).map(|p| p.taste.clone()))
    }

    async fn load_candidate_pool(&self, excluding_user_id: &str) -> AppResult<Vec<CandidateRecord>> {
        let profiles = self.profiles.read().await;
        let mut candidates: Vec<CandidateRecord> = profiles
            .values()
            .filter(|p| p.profile_completed && p.user_id != excluding_user_id)
            .map(|p| CandidateRecord {
                user_id: p.user_id.clone(),
                taste: p.taste.clone(),
                display_profile: p.display_profile.clone(),
            })
            .collect();
        candidates.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(candidates)
    }

    async fn save_profile(&self, user_id: &str, profile: ProfileUpsert) -> AppResult<StoredProfile> {
        let stored = StoredProfile {
            user_id: user_id.to_string(),
            display_profile: DisplayProfile::with_placeholders(
                user_id,
                profile.name,
                profile.bio,
                profile.location,
            ),
            taste: profile.taste,
            profile_completed: true,
            updated_at: Utc::now(),
        };

        self.profiles
            .write()
            .await
            .insert(user_id.to_string(), stored.clone());

        Ok(stored)
    }

    async fn load_profile(&self, user_id: &str) -> AppResult<Option<StoredProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn save_taste_profile(
        &self,
        user_id: &str,
        profile: TasteProfile,
    ) -> AppResult<StoredTasteProfile> {
        if !self.profiles.read().await.contains_key(user_id) {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        let stored = StoredTasteProfile {
            profile,
            generated_at: Utc::now(),
        };
        self.taste_profiles
            .write()
            .await
            .insert(user_id.to_string(), stored.clone());

        Ok(stored)
    }

    async fn load_taste_profile(&self, user_id: &str) -> AppResult<Option<StoredTasteProfile>> {
        if !self.profiles.read().await.contains_key(user_id) {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }
        Ok(self.taste_profiles.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taste(category: &str, interest: &str) -> UserTaste {
        let mut taste = UserTaste::default();
        taste
            .interests
            .insert(category.to_string(), vec![interest.to_string()]);
        taste
    }

    #[tokio::test]
    async fn test_candidate_pool_excludes_user_and_incomplete_profiles() {
        let repository = InMemoryTasteRepository::new();
        repository.insert("user_a", taste("artist", "Drake"), true).await;
        repository.insert("user_b", taste("artist", "Drake"), true).await;
        repository.insert("user_c", taste("artist", "Drake"), false).await;

        let pool = tokio_test::assert_ok!(repository.load_candidate_pool("user_a").await);
        let ids: Vec<&str> = pool.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(ids, vec!["user_b"]);
    }

    #[tokio::test]
    async fn test_incomplete_profile_still_loads_as_querying_user() {
        let repository = InMemoryTasteRepository::new();
        repository.insert("user_c", taste("book", "Dune"), false).await;

        let loaded = tokio_test::assert_ok!(repository.load_user_taste("user_c").await);
        assert_eq!(loaded, Some(taste("book", "Dune")));
        assert_eq!(repository.load_user_taste("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_profile_overwrites_and_completes() {
        let repository = InMemoryTasteRepository::new();
        repository.insert("user_a", taste("artist", "Drake"), false).await;

        let saved = repository
            .save_profile(
                "user_a",
                ProfileUpsert {
                    taste: taste("movie", "Heat"),
                    name: Some("Ana".to_string()),
                    bio: None,
                    location: None,
                },
            )
            .await
            .unwrap();

        assert!(saved.profile_completed);
        assert_eq!(saved.display_profile.name, "Ana");

        let loaded = repository.load_profile("user_a").await.unwrap().unwrap();
        assert_eq!(loaded.taste, taste("movie", "Heat"));
    }

    #[tokio::test]
    async fn test_taste_profile_requires_existing_user() {
        let repository = InMemoryTasteRepository::new();

        let result = repository
            .save_taste_profile("ghost", TasteProfile::unavailable_fallback())
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound(id)) if id == "ghost"));
        assert!(matches!(
            repository.load_taste_profile("ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_taste_profile_round_trip() {
        let repository = InMemoryTasteRepository::new();
        repository.insert("user_a", taste("artist", "Drake"), true).await;

        assert_eq!(tokio_test::assert_ok!(repository.load_taste_profile("user_a").await), None);

        repository
            .save_taste_profile("user_a", TasteProfile::unparsed_fallback())
            .await
            .unwrap();

        let loaded = repository.load_taste_profile("user_a").await.unwrap().unwrap();
        assert_eq!(loaded.profile.headline, "The Taste Explorer");
    }
}
