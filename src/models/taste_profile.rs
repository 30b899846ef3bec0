use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI-written summary of a user's taste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub headline: String,
    pub description: String,
    /// One-word aesthetic
    pub vibe: String,
    #[serde(default)]
    pub traits: Vec<String>,
    /// Who this person would connect with
    pub compatibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl TasteProfile {
    /// Used when the generator answered but its output could not be parsed
    pub fn unparsed_fallback() -> Self {
        Self {
            headline: "The Taste Explorer".to_string(),
            description: "Someone with unique and diverse interests who loves discovering new \
                          experiences across different categories."
                .to_string(),
            vibe: "Eclectic".to_string(),
            traits: ["Curious", "Open-minded", "Adventurous", "Creative"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            compatibility: "You'd connect well with fellow explorers who appreciate diversity in \
                            culture, art, and experiences."
                .to_string(),
            emoji: Some("🌟".to_string()),
        }
    }

    /// Used when the generator could not be reached at all
    pub fn unavailable_fallback() -> Self {
        Self {
            headline: "The Unique Individual".to_string(),
            description: "Someone with distinctive tastes and interests who brings a fresh \
                          perspective to any conversation."
                .to_string(),
            vibe: "Authentic".to_string(),
            traits: ["Genuine", "Interesting", "Thoughtful", "Creative"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            compatibility: "You'd connect well with people who appreciate authenticity and \
                            diverse interests."
                .to_string(),
            emoji: Some("✨".to_string()),
        }
    }

    /// Headline, description, vibe and compatibility must all be non-blank
    pub fn is_complete(&self) -> bool {
        [&self.headline, &self.description, &self.vibe, &self.compatibility]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Whether a taste profile came from the generator or a canned fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TasteProfileSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTasteProfile {
    pub profile: TasteProfile,
    pub source: TasteProfileSource,
}

/// A persisted taste profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTasteProfile {
    #[serde(flatten)]
    pub profile: TasteProfile,
    pub generated_at: DateTime<Utc>,
}
