//! Gemini-backed suggestion generator.
//!
//! Calls the `generateContent` REST endpoint with JSON output mode and
//! parses `{"suggestions": [{placeName, searchQuery}]}` from the reply.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::SearchError;
use crate::http::redact;
use crate::types::QuerySuggestion;

use super::{GeneratorInput, SuggestionGenerator};

const TEXT_INSTRUCTION: &str = "You are an assistant that suggests 3-5 diverse and relevant search queries for finding local places based on a user's text input and location. Focus on variety and potential user intent.";

const IMAGE_INSTRUCTION: &str = "You are an assistant that analyzes an image and suggests 3-5 diverse and relevant search queries for finding local places related to the image content and the user's location. Focus on variety and potential user intent.";

const OUTPUT_FORMAT: &str = r#"For each suggestion give a conceptual "placeName" and a "searchQuery" suitable for a places API.
Return ONLY a JSON object of the form:
{"suggestions": [{"placeName": "Quick Coffee", "searchQuery": "best independent coffee shops"}]}"#;

/// [`SuggestionGenerator`] backed by a Gemini model.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
    timeout: Option<Duration>,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self {
            client,
            config,
            timeout: None,
        }
    }

    /// Per-request timeout, replacing the client's own.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(input: GeneratorInput<'_>, latitude: f64, longitude: f64) -> GenerateRequest {
        let location = format!("User's current location: Latitude {latitude}, Longitude {longitude}");
        let (instruction, parts) = match input {
            GeneratorInput::Text(text) => (
                TEXT_INSTRUCTION,
                vec![Part::text(format!(
                    "User's text input: \"{text}\"\n{location}\n\n{OUTPUT_FORMAT}"
                ))],
            ),
            GeneratorInput::Image(image) => (
                IMAGE_INSTRUCTION,
                vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                        },
                    },
                    Part::text(format!("{location}\n\n{OUTPUT_FORMAT}")),
                ],
            ),
        };

        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(instruction.to_owned())],
            },
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
            },
        }
    }
}

#[async_trait]
impl SuggestionGenerator for GeminiGenerator {
    async fn suggest(
        &self,
        input: GeneratorInput<'_>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<QuerySuggestion>, SearchError> {
        let body = Self::build_request(input, latitude, longitude);
        let key = self.config.api_key.as_str();

        let mut request = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                SearchError::Expansion(redact(&format!("Gemini request failed: {e}"), key))
            })?
            .error_for_status()
            .map_err(|e| SearchError::Expansion(redact(&format!("Gemini HTTP error: {e}"), key)))?;

        let reply: GenerateResponse = response.json().await.map_err(|e| {
            SearchError::Expansion(redact(&format!("Gemini response malformed: {e}"), key))
        })?;

        let text = reply.text().ok_or_else(|| {
            SearchError::Expansion("Gemini returned no candidate text".into())
        })?;
        let suggestions = parse_suggestions(&text)?;
        tracing::debug!(
            model = %self.config.model,
            count = suggestions.len(),
            "Gemini suggestions parsed"
        );
        Ok(suggestions)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

/// Parse the model's JSON reply, tolerating a Markdown code fence.
fn parse_suggestions(text: &str) -> Result<Vec<QuerySuggestion>, SearchError> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    let parsed: SuggestionsPayload = serde_json::from_str(json.trim())
        .map_err(|e| SearchError::Expansion(format!("suggestions are not valid JSON: {e}")))?;
    Ok(parsed.suggestions)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl Part {
    fn text(text: String) -> Self {
        Self::Text { text }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text),
                Part::InlineData { .. } => None,
            })
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsPayload {
    #[serde(default)]
    suggestions: Vec<QuerySuggestion>,
}
