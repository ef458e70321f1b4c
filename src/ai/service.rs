//! The three assist operations on top of a [`GenerativeModel`].

use std::sync::Arc;

use tracing::{error, info};

use crate::ai::client::{GeminiClient, GenerateRequest, GenerativeModel};
use crate::ai::concept::{response_schema, MusicConcept, MusicConceptParams};
use crate::ai::prompts;
use crate::config::AiConfig;
use crate::error::{Result, StudioError};

/// Shown in place of a lyrics or voice result when no key is configured.
pub const MISSING_KEY_MESSAGE: &str = "Error: API Key missing.";
pub const NO_LYRICS_MESSAGE: &str = "No lyrics generated.";
pub const NO_PROFILE_MESSAGE: &str = "No profile generated.";

#[derive(Clone)]
pub struct AssistService {
    /// `None` when no credential is configured.
    model: Option<Arc<dyn GenerativeModel>>,
    lyrics_temperature: f32,
}

impl std::fmt::Debug for AssistService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistService")
            .field("configured", &self.model.is_some())
            .field("lyrics_temperature", &self.lyrics_temperature)
            .finish()
    }
}

impl AssistService {
    /// Service backed by the Gemini client, or an unconfigured one when the
    /// credential is missing.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let model: Option<Arc<dyn GenerativeModel>> = match GeminiClient::new(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(StudioError::MissingCredential) => {
                error!("API_KEY is missing in the environment");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            model,
            lyrics_temperature: config.lyrics_temperature,
        })
    }

    pub fn with_model(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model: Some(model),
            lyrics_temperature: AiConfig::default().lyrics_temperature,
        }
    }

    /// A service with no credential.
    pub fn unconfigured() -> Self {
        Self {
            model: None,
            lyrics_temperature: AiConfig::default().lyrics_temperature,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&Arc<dyn GenerativeModel>> {
        self.model.as_ref().ok_or(StudioError::MissingCredential)
    }

    pub async fn generate_lyrics(&self, prompt: &str) -> Result<String> {
        let model = self.model()?;
        let request =
            GenerateRequest::text(prompts::lyrics_prompt(prompt)).with_temperature(self.lyrics_temperature);
        let text = model.generate(request).await?;
        info!(chars = text.len(), "lyrics generated");
        Ok(non_empty_or(text, NO_LYRICS_MESSAGE))
    }

    /// `Ok(None)` when the model returned nothing.
    pub async fn generate_music_concept(&self, params: &MusicConceptParams) -> Result<Option<MusicConcept>> {
        let model = self.model()?;
        let request = GenerateRequest::text(prompts::concept_prompt(params)).with_json_schema(response_schema());
        let text = model.generate(request).await?;
        let concept = MusicConcept::from_model_text(&text).map_err(|e| StudioError::AiResponse {
            reason: format!("concept is not valid JSON: {}", e),
        })?;
        info!(found = concept.is_some(), "music concept generated");
        Ok(concept)
    }

    pub async fn generate_voice_profile_description(&self, description: &str) -> Result<String> {
        let model = self.model()?;
        let request = GenerateRequest::text(prompts::voice_profile_prompt(description));
        let text = model.generate(request).await?;
        info!(chars = text.len(), "voice profile generated");
        Ok(non_empty_or(text, NO_PROFILE_MESSAGE))
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted model for tests.
    #[derive(Default)]
    pub(crate) struct FakeModel {
        pub replies: Mutex<Vec<Result<String>>>,
        pub seen: Mutex<Vec<GenerateRequest>>,
    }

    impl FakeModel {
        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(vec![Ok(reply.to_string())]),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        async fn generate(&self, request: GenerateRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request);
            self.replies.lock().unwrap().pop().unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[tokio::test]
    async fn test_lyrics_uses_temperature() {
        let model = FakeModel::replying("Verse 1\nla la");
        let service = AssistService::with_model(model.clone());
        let lyrics = service.generate_lyrics("summer").await.unwrap();
        assert_eq!(lyrics, "Verse 1\nla la");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, Some(0.8));
        assert!(seen[0].prompt.contains("Prompt: summer"));
    }

    #[tokio::test]
    async fn test_empty_output_fallbacks() {
        let service = AssistService::with_model(FakeModel::replying(""));
        assert_eq!(service.generate_lyrics("x").await.unwrap(), NO_LYRICS_MESSAGE);

        let service = AssistService::with_model(FakeModel::replying("   "));
        assert_eq!(
            service.generate_voice_profile_description("x").await.unwrap(),
            NO_PROFILE_MESSAGE
        );

        let service = AssistService::with_model(FakeModel::replying(""));
        assert_eq!(
            service
                .generate_music_concept(&MusicConceptParams::default())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_concept_requests_json() {
        let model = FakeModel::replying(r#"{"conceptName":"Glass"}"#);
        let service = AssistService::with_model(model.clone());
        let concept = service
            .generate_music_concept(&MusicConceptParams::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(concept.concept_name, "Glass");
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].response_mime_type.as_deref(), Some("application/json"));
        assert!(seen[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_reports_missing_credential() {
        let service = AssistService::unconfigured();
        let err = service.generate_lyrics("x").await.unwrap_err();
        assert!(matches!(err, StudioError::MissingCredential));
    }
}
