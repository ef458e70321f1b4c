//! Generative-AI collaborator.
//!
//! [`GenerativeModel`] is the seam the assist service talks to;
//! [`GeminiClient`] implements it over the `generateContent` REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AiConfig;
use crate::error::{Result, StudioError};

/// One text-generation call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    /// e.g. `application/json` for structured output.
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }
}

/// Anything that turns a prompt into text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generated text; empty when the model produced nothing.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

// ---- wire format ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl ContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

/// `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_ms: u64,
}

impl GeminiClient {
    /// Build a client from configuration; fails without a credential.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(StudioError::MissingCredential)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StudioError::AiRequest {
                reason: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[tracing::instrument(
        skip(self, request),
        fields(model = %self.model, prompt_len = request.prompt.len())
    )]
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let generation_config = (request.temperature.is_some()
            || request.response_mime_type.is_some()
            || request.response_schema.is_some())
        .then(|| GenerationConfig {
            temperature: request.temperature,
            response_mime_type: request.response_mime_type.as_deref(),
            response_schema: request.response_schema.as_ref(),
        });
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config,
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StudioError::AiRequest {
                        reason: format!("timed out after {} ms", self.timeout_ms),
                    }
                } else {
                    StudioError::AiRequest {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StudioError::AiRequest {
                reason: format!("model returned {}: {}", status, detail.trim()),
            });
        }

        let parsed: ContentResponse = response.json().await.map_err(|e| StudioError::AiResponse {
            reason: format!("unexpected response body: {}", e),
        })?;
        let text = parsed.text();
        tracing::debug!(chars = text.len(), "generation complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_rejected() {
        let err = GeminiClient::new(&AiConfig::default()).unwrap_err();
        assert!(matches!(err, StudioError::MissingCredential));
    }

    #[test]
    fn test_endpoint() {
        let config = AiConfig {
            api_key: Some("k".to_string()),
            base_url: "http://localhost:9000/".to_string(),
            ..AiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let schema = serde_json::json!({ "type": "OBJECT" });
        let body = ContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.5),
                response_mime_type: Some("application/json"),
                response_schema: Some(&schema),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let parsed: ContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Verse "},{"text":"one"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text(), "Verse one");

        let empty: ContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }
}
