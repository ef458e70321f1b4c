//! AI Client Tests
//!
//! The generateContent client and assist panel against a mock HTTP server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use daw_shell::ai::{
    AssistPanel, AssistService, GeminiClient, GenerateRequest, GenerativeModel, Generator,
    MusicConceptParams, MISSING_KEY_MESSAGE,
};
use daw_shell::config::AiConfig;

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn config_for(server: &MockServer) -> AiConfig {
    AiConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        ..AiConfig::default()
    }
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    }))
}

// === Client ===

#[tokio::test]
async fn test_client_sends_key_header_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })))
        .respond_with(reply("hi there"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let text = client.generate(GenerateRequest::text("hello")).await.unwrap();
    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn test_server_error_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let err = client.generate(GenerateRequest::text("x")).await.unwrap_err();
    assert_eq!(err.error_code(), "AI_REQUEST_FAILED");
    assert!(err.to_string().contains("500"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_garbage_body_is_response_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).unwrap();
    let err = client.generate(GenerateRequest::text("x")).await.unwrap_err();
    assert_eq!(err.error_code(), "AI_RESPONSE_INVALID");
}

// === Service ===

#[tokio::test]
async fn test_concept_requests_json_and_parses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(reply(
            r#"{"conceptName":"Neon Drift","bpm":"100","key":"A Minor",
                "instrumentation":["Analog Synths"],"structure":["Intro","Drop"],
                "productionTips":["Sidechain the pads"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = AssistService::from_config(&config_for(&server)).unwrap();
    let concept = service
        .generate_music_concept(&MusicConceptParams::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(concept.concept_name, "Neon Drift");
    assert_eq!(concept.structure, vec!["Intro", "Drop"]);
    assert_eq!(concept.time_signature, None);
}

#[tokio::test]
async fn test_concept_carries_meter_and_arrangement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(reply(
            r#"{"conceptName":"Slow Waltz","bpm":"84","key":"D Major","timeSignature":"3/4",
                "instrumentation":["Strings"],"structure":["Intro","Theme"],
                "productionTips":["Leave headroom"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let params = MusicConceptParams {
        time_signature: Some("3/4".to_string()),
        arrangement: Some("Intro, Theme, Coda".to_string()),
        ..MusicConceptParams::default()
    };
    let service = AssistService::from_config(&config_for(&server)).unwrap();
    let concept = service.generate_music_concept(&params).await.unwrap().unwrap();
    assert_eq!(concept.time_signature.as_deref(), Some("3/4"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("Time Signature: 3/4"));
    assert!(body.contains("Arrangement: Intro, Theme, Coda"));
    assert!(body.contains("timeSignature"));
}

#[tokio::test]
async fn test_empty_lyrics_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("   "))
        .mount(&server)
        .await;

    let service = AssistService::from_config(&config_for(&server)).unwrap();
    assert_eq!(service.generate_lyrics("rain").await.unwrap(), "No lyrics generated.");
}

// === Panel ===

#[tokio::test]
async fn test_panel_round_trip_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("Verse one"))
        .mount(&server)
        .await;

    let service = Arc::new(AssistService::from_config(&config_for(&server)).unwrap());
    let mut panel = AssistPanel::new(service);
    panel.open();
    panel.lyrics_prompt = "city lights".to_string();

    assert!(panel.request_lyrics());
    assert!(panel.is_loading());
    assert_eq!(panel.next_completion().await, Some(Generator::Lyrics));
    assert!(!panel.is_loading());
    assert_eq!(panel.lyrics(), Some("Verse one"));
}

#[tokio::test]
async fn test_panel_failure_keeps_previous_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("First take"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = Arc::new(AssistService::from_config(&config_for(&server)).unwrap());
    let mut panel = AssistPanel::new(service);
    panel.voice_description = "warm alto".to_string();

    assert!(panel.request_voice_profile());
    panel.next_completion().await;
    assert_eq!(panel.voice_profile(), Some("First take"));

    assert!(panel.request_voice_profile());
    panel.next_completion().await;
    assert_eq!(panel.voice_profile(), Some("First take"));
    assert!(!panel.is_loading());
}

#[tokio::test]
async fn test_missing_key_is_shown_inline() {
    let service = Arc::new(AssistService::from_config(&AiConfig::default()).unwrap());
    assert!(!service.is_configured());

    let mut panel = AssistPanel::new(service);
    panel.lyrics_prompt = "anything".to_string();
    assert!(panel.request_lyrics());
    panel.next_completion().await;
    assert_eq!(panel.lyrics(), Some(MISSING_KEY_MESSAGE));
}
