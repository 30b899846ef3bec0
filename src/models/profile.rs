use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PLACEHOLDER_BIO: &str = "Music lover, movie enthusiast, always exploring new places";
const PLACEHOLDER_LOCATION: &str = "🌍";

/// Entity returned by the taste-graph enrichment provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightItem {
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// Entity found by a free-text taste-graph search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntity {
    pub entity_id: String,
    pub name: String,
    /// Entity type URNs, e.g. `urn:entity:artist`
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

/// A user's stored taste data, keyed by raw category name
///
/// Category names are kept as strings here; unknown names are dropped when the
/// taste vector is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTaste {
    #[serde(default)]
    pub interests: HashMap<String, Vec<String>>,
    #[serde(default, rename = "insights")]
    pub enrichment: HashMap<String, Vec<InsightItem>>,
}

/// Public-facing profile fields shown next to a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayProfile {
    pub name: String,
    pub bio: String,
    pub location: String,
}

impl DisplayProfile {
    /// Builds a display profile, substituting placeholders for missing fields
    pub fn with_placeholders(
        user_id: &str,
        name: Option<String>,
        bio: Option<String>,
        location: Option<String>,
    ) -> Self {
        let name = name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
            let chars: Vec<char> = user_id.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("User {}", tail)
        });

        Self {
            name,
            bio: bio
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_BIO.to_string()),
            location: location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_LOCATION.to_string()),
        }
    }
}

/// One eligible user in the candidate pool
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub user_id: String,
    pub taste: UserTaste,
    pub display_profile: DisplayProfile,
}

/// Request body for saving a profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpsert {
    #[serde(flatten)]
    pub taste: UserTaste,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A profile as stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub user_id: String,
    #[serde(flatten)]
    pub taste: UserTaste,
    pub display_profile: DisplayProfile,
    pub profile_completed: bool,
    pub updated_at: DateTime<Utc>,
}
