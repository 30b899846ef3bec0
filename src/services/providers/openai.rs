//! OpenAI chat-completions text generator
//!
//! Compatibility blurbs come back as `{"text": ..., "tags": [...]}` and taste
//! profiles as `{"headline": ..., "vibe": ..., ...}`. Both are pulled out of the
//! first JSON object in the reply. Transient failures are retried with
//! exponential backoff.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ExplanationRequest, GeneratedExplanation, GenerationError, TasteProfileRequest, TextGenerator,
};
use crate::models::TasteProfile;
use crate::services::retry::{call_with_retry, RetryConfig};

const EXPLANATION_SYSTEM_PROMPT: &str = "You are a matchmaking expert who creates engaging, \
personalized compatibility explanations based on shared interests. Always answer with a single \
JSON object.";
const PROFILE_SYSTEM_PROMPT: &str = "You write short, specific personality profiles from a \
person's cultural tastes. Always answer with a single JSON object.";
const EXPLANATION_MAX_TOKENS: u32 = 200;
const PROFILE_MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: &str,
        api_url: &str,
        model: &str,
        retry: RetryConfig,
    ) -> Result<Self, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                GenerationError::InvalidResponse(format!("Invalid API key format: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Network(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            retry,
        })
    }

    /// One chat-completions round trip, returning the raw message content
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self.http_client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(GenerationError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("No choices returned".to_string()))
    }

    async fn explanation_once(&self, prompt: &str) -> Result<GeneratedExplanation, GenerationError> {
        let content = self
            .complete(EXPLANATION_SYSTEM_PROMPT, prompt, EXPLANATION_MAX_TOKENS)
            .await?;
        parse_explanation(&content)
    }

    async fn taste_profile_once(&self, prompt: &str) -> Result<TasteProfile, GenerationError> {
        let content = self
            .complete(PROFILE_SYSTEM_PROMPT, prompt, PROFILE_MAX_TOKENS)
            .await?;
        parse_taste_profile(&content)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_explanation(
        &self,
        request: &ExplanationRequest,
    ) -> Result<GeneratedExplanation, GenerationError> {
        let prompt = build_prompt(request);
        call_with_retry(|| self.explanation_once(&prompt), &self.retry).await
    }

    async fn generate_taste_profile(
        &self,
        request: &TasteProfileRequest,
    ) -> Result<TasteProfile, GenerationError> {
        let prompt = build_taste_profile_prompt(request);
        call_with_retry(|| self.taste_profile_once(&prompt), &self.retry).await
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Renders the user prompt for one match
pub fn build_prompt(request: &ExplanationRequest) -> String {
    let user_interests = request
        .user_interests
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(category, values)| format!("{}: {}", category, values.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let shared = request
        .shared_entities
        .iter()
        .map(|(category, items)| format!("{}: {}", category, items.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate a brief, engaging compatibility blurb (2-3 sentences) explaining why these two \
users seem like a good fit, plus 2-4 short tags (1-3 words each).

CURRENT USER'S INTERESTS:
{user_interests}

MATCH USER'S PROFILE:
Name: {name}
Bio: {bio}
Location: {location}

SHARED INTERESTS:
{shared}

MATCH SCORE: {score:.0}%

Highlight the strongest shared interests and keep it warm and conversational.
Respond with JSON only: {{\"text\": \"...\", \"tags\": [\"...\"]}}",
        name = request.candidate.name,
        bio = request.candidate.bio,
        location = request.candidate.location,
        score = request.match_score * 100.0,
    )
}

/// Renders the prompt for a taste-profile summary
pub fn build_taste_profile_prompt(request: &TasteProfileRequest) -> String {
    // (category, first three items, total count)
    let mut specific: Vec<(&str, Vec<&str>, usize)> = request
        .interests
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(category, values)| {
            let items = values.iter().take(3).map(String::as_str).collect();
            (category.as_str(), items, values.len())
        })
        .collect();

    let breakdown = specific
        .iter()
        .map(|(category, items, count)| {
            format!("{} ({} items): {}", category.to_uppercase(), count, items.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let insights = request
        .insights
        .iter()
        .filter(|(_, entities)| !entities.is_empty())
        .map(|(category, entities)| {
            let names = entities
                .iter()
                .take(3)
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} recommendations: {}", category, names)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let total_interests: usize = request.interests.values().map(Vec::len).sum();
    let category_count = request.interests.len();
    let combination = specific
        .iter()
        .flat_map(|(_, items, _)| items.iter().copied())
        .take(8)
        .collect::<Vec<_>>()
        .join(", ");

    specific.sort_by(|a, b| b.2.cmp(&a.2));
    let dominant = specific
        .iter()
        .take(3)
        .map(|(category, _, _)| *category)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Create a highly personalized taste profile for someone with these specific interests. \
Avoid generic language.

DETAILED INTEREST BREAKDOWN:
{breakdown}

RELATED RECOMMENDATIONS:
{insights}

UNIQUENESS FACTORS:
- Total interests: {total_interests} across {category_count} categories
- Dominant areas: {dominant}
- Unique combination: {combination}

Respond with JSON only:
{{\"headline\": \"4-8 word headline specific to this combination\", \
\"description\": \"2-3 sentences written for this person\", \
\"vibe\": \"one distinctive word\", \
\"traits\": [\"4-5 personality traits\"], \
\"compatibility\": \"who would connect with this person\", \
\"emoji\": \"one emoji for the whole combination\"}}"
    )
}

/// Slices the outermost `{...}` out of model output
fn extract_json_object(content: &str) -> Result<&str, GenerationError> {
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&content[start..=end]),
        _ => Err(GenerationError::InvalidResponse(
            "No JSON object in model output".to_string(),
        )),
    }
}

/// Extracts a compatibility blurb from model output
pub fn parse_explanation(content: &str) -> Result<GeneratedExplanation, GenerationError> {
    let json = extract_json_object(content)?;
    let mut parsed: GeneratedExplanation = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidResponse(format!("Malformed JSON: {}", e)))?;

    parsed.text = parsed.text.trim().to_string();
    if parsed.text.is_empty() {
        return Err(GenerationError::InvalidResponse(
            "Empty explanation text".to_string(),
        ));
    }
    parsed.tags.retain(|tag| !tag.trim().is_empty());

    Ok(parsed)
}

/// Extracts a taste profile from model output
pub fn parse_taste_profile(content: &str) -> Result<TasteProfile, GenerationError> {
    let json = extract_json_object(content)?;
    let mut profile: TasteProfile = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidResponse(format!("Malformed JSON: {}", e)))?;

    if !profile.is_complete() {
        return Err(GenerationError::InvalidResponse(
            "Taste profile is missing fields".to_string(),
        ));
    }
    profile.traits = profile
        .traits
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    profile.emoji = profile.emoji.filter(|e| !e.trim().is_empty());

    Ok(profile)
}
