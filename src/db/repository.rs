use crate::{
    error::AppResult,
    models::{CandidateRecord, ProfileUpsert, StoredProfile, StoredTasteProfile, TasteProfile, UserTaste},
};

/// Storage boundary for user taste profiles
///
/// Only profiles marked complete are eligible candidates. Implementations never
/// return partial pools: a failed read is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TasteRepository: Send + Sync {
    /// Loads one user's taste data, `None` if the user has no profile
    async fn load_user_taste(&self, user_id: &str) -> AppResult<Option<UserTaste>>;

    /// Loads every complete profile except `excluding_user_id`
    async fn load_candidate_pool(&self, excluding_user_id: &str) -> AppResult<Vec<CandidateRecord>>;

    /// Creates or replaces a profile and marks it complete
    async fn save_profile(&self, user_id: &str, profile: ProfileUpsert) -> AppResult<StoredProfile>;

    /// Loads a stored profile
    async fn load_profile(&self, user_id: &str) -> AppResult<Option<StoredProfile>>;

    /// Attaches a taste profile to an existing user, `UserNotFound` otherwise
    async fn save_taste_profile(
        &self,
        user_id: &str,
        profile: TasteProfile,
    ) -> AppResult<StoredTasteProfile>;

    /// `Ok(None)` when the user exists but has no taste profile yet
    async fn load_taste_profile(&self, user_id: &str) -> AppResult<Option<StoredTasteProfile>>;
}
