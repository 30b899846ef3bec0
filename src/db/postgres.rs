use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::collections::HashMap;

use super::TasteRepository;
use crate::{
    error::{AppError, AppResult},
    models::{
        CandidateRecord, DisplayProfile, InsightItem, ProfileUpsert, StoredProfile,
        StoredTasteProfile, TasteProfile, UserTaste,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Row of the `user_profiles` table
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    interests: Json<HashMap<String, Vec<String>>>,
    insights: Json<HashMap<String, Vec<InsightItem>>>,
    display_name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    profile_completed: bool,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn taste(&self) -> UserTaste {
        UserTaste {
            interests: self.interests.0.clone(),
            enrichment: self.insights.0.clone(),
        }
    }

    fn display_profile(&self) -> DisplayProfile {
        DisplayProfile::with_placeholders(
            &self.user_id,
            self.display_name.clone(),
            self.bio.clone(),
            self.location.clone(),
        )
    }
}

impl From<ProfileRow> for CandidateRecord {
    fn from(row: ProfileRow) -> Self {
        let taste = row.taste();
        let display_profile = row.display_profile();
        Self {
            user_id: row.user_id,
            taste,
            display_profile,
        }
    }
}

impl From<ProfileRow> for StoredProfile {
    fn from(row: ProfileRow) -> Self {
        let taste = row.taste();
        let display_profile = row.display_profile();
        Self {
            user_id: row.user_id,
            taste,
            display_profile,
            profile_completed: row.profile_completed,
            updated_at: row.updated_at,
        }
    }
}

/// Taste-profile columns of `user_profiles`; all null until one is saved
#[derive(Debug, sqlx::FromRow)]
struct TasteProfileRow {
    taste_profile_headline: Option<String>,
    taste_profile_description: Option<String>,
    taste_profile_vibe: Option<String>,
    taste_profile_traits: Option<Vec<String>>,
    taste_profile_compatibility: Option<String>,
    taste_profile_emoji: Option<String>,
    taste_profile_generated_at: Option<DateTime<Utc>>,
}

impl TasteProfileRow {
    fn into_stored(self) -> Option<StoredTasteProfile> {
        let headline = self.taste_profile_headline?;
        let generated_at = self.taste_profile_generated_at?;
        Some(StoredTasteProfile {
            profile: TasteProfile {
                headline,
                description: self.taste_profile_description.unwrap_or_default(),
                vibe: self.taste_profile_vibe.unwrap_or_default(),
                traits: self.taste_profile_traits.unwrap_or_default(),
                compatibility: self.taste_profile_compatibility.unwrap_or_default(),
                emoji: self.taste_profile_emoji,
            },
            generated_at,
        })
    }
}

const TASTE_PROFILE_COLUMNS: &str = "taste_profile_headline, taste_profile_description, \
     taste_profile_vibe, taste_profile_traits, taste_profile_compatibility, taste_profile_emoji, \
     taste_profile_generated_at";

const PROFILE_COLUMNS: &str =
    "user_id, interests, insights, display_name, bio, location, profile_completed, updated_at";

/// Taste repository backed by the `user_profiles` table
#[derive(Clone)]
pub struct PgTasteRepository {
    pool: PgPool,
}

impl PgTasteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TasteRepository for PgTasteRepository {
    async fn load_user_taste(&self, user_id: &str) -> AppResult<Option<UserTaste>> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.taste()))
    }

    async fn load_candidate_pool(&self, excluding_user_id: &str) -> AppResult<Vec<CandidateRecord>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_profiles \
             WHERE user_id <> $1 AND profile_completed = true \
             ORDER BY user_id",
            PROFILE_COLUMNS
        ))
        .bind(excluding_user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            excluding = %excluding_user_id,
            candidates = rows.len(),
            "Loaded candidate pool"
        );

        Ok(rows.into_iter().map(CandidateRecord::from).collect())
    }

    async fn save_profile(&self, user_id: &str, profile: ProfileUpsert) -> AppResult<StoredProfile> {
        let row: ProfileRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO user_profiles
                (user_id, interests, insights, display_name, bio, location, profile_completed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, true, now())
            ON CONFLICT (user_id) DO UPDATE SET
                interests = EXCLUDED.interests,
                insights = EXCLUDED.insights,
                display_name = EXCLUDED.display_name,
                bio = EXCLUDED.bio,
                location = EXCLUDED.location,
                profile_completed = true,
                updated_at = now()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(Json(&profile.taste.interests))
        .bind(Json(&profile.taste.enrichment))
        .bind(&profile.name)
        .bind(&profile.bio)
        .bind(&profile.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn load_profile(&self, user_id: &str) -> AppResult<Option<StoredProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredProfile::from))
    }

    async fn save_taste_profile(
        &self,
        user_id: &str,
        profile: TasteProfile,
    ) -> AppResult<StoredTasteProfile> {
        let row: Option<TasteProfileRow> = sqlx::query_as(&format!(
            r#"
            UPDATE user_profiles SET
                taste_profile_headline = $2,
                taste_profile_description = $3,
                taste_profile_vibe = $4,
                taste_profile_traits = $5,
                taste_profile_compatibility = $6,
                taste_profile_emoji = $7,
                taste_profile_generated_at = now(),
                updated_at = now()
            WHERE user_id = $1
            RETURNING {}
            "#,
            TASTE_PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&profile.headline)
        .bind(&profile.description)
        .bind(&profile.vibe)
        .bind(&profile.traits)
        .bind(&profile.compatibility)
        .bind(&profile.emoji)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?
            .into_stored()
            .ok_or_else(|| AppError::Internal("Taste profile was not persisted".to_string()))
    }

    async fn load_taste_profile(&self, user_id: &str) -> AppResult<Option<StoredTasteProfile>> {
        let row: Option<TasteProfileRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            TASTE_PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?
            .into_stored())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_row() -> TasteProfileRow {
        TasteProfileRow {
            taste_profile_headline: None,
            taste_profile_description: None,
            taste_profile_vibe: None,
            taste_profile_traits: None,
            taste_profile_compatibility: None,
            taste_profile_emoji: None,
            taste_profile_generated_at: None,
        }
    }

    #[test]
    fn test_taste_profile_row_without_headline_is_none() {
        let mut row = empty_row();
        row.taste_profile_generated_at = Some(Utc::now());
        assert_eq!(row.into_stored(), None);
    }

    #[test]
    fn test_taste_profile_row_defaults_missing_columns() {
        let mut row = empty_row();
        row.taste_profile_headline = Some("Neon Noir Nomad".to_string());
        row.taste_profile_generated_at = Some(Utc::now());

        let stored = row.into_stored().unwrap();
        assert_eq!(stored.profile.headline, "Neon Noir Nomad");
        assert!(stored.profile.traits.is_empty());
        assert_eq!(stored.profile.emoji, None);
    }
}
