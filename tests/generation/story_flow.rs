use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer};

use taleforge::generation::GenerationRequest;
use taleforge::prompt::{StoryLength, StoryMetadata};
use taleforge::providers::{FailureKind, GenerationResult, ProviderKind};

use crate::studio_harness::{
    ANTHROPIC_KEY, OPENAI_KEY, anthropic_reply, config_for, error_reply, openai_reply,
    orchestrator,
};

#[tokio::test]
async fn openai_output_text_becomes_story_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", format!("Bearer {OPENAI_KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_output_tokens": 800
        })))
        .respond_with(openai_reply("Once, on a storm-lit coast..."))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi]);
    let metadata = StoryMetadata {
        genre: Some("gothic".into()),
        length: StoryLength::Short,
        ..StoryMetadata::default()
    };
    let request = GenerationRequest::story(
        ProviderKind::OpenAi,
        OPENAI_KEY,
        "A lighthouse keeper finds a letter",
    )
    .with_metadata(metadata);

    let result = orchestrator(&config).generate(&request).await;
    let GenerationResult::Success(success) = result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(success.content, "Once, on a storm-lit coast...");
    assert_eq!(success.model, "gpt-4o-mini");
    assert_eq!(success.tokens_used, Some(460));
    server.verify().await;
}

#[tokio::test]
async fn anthropic_feedback_uses_messages_protocol() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", ANTHROPIC_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(anthropic_reply("Tighten the opening paragraph."))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Anthropic]);
    let request = GenerationRequest::feedback(
        ProviderKind::Anthropic,
        ANTHROPIC_KEY,
        "The fog rolled in. It was foggy.",
        "Is the opening too repetitive?",
    );

    let result = orchestrator(&config).generate(&request).await;
    assert_eq!(result.content(), Some("Tighten the opening paragraph."));

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let user_text = body["messages"][0]["content"][0]["text"].as_str().unwrap();
    assert!(user_text.contains("The fog rolled in. It was foggy."));
    assert!(user_text.contains("Is the opening too repetitive?"));
    assert!(body["system"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn unauthorized_key_is_reported_without_leaking_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(error_reply(401, &format!("Incorrect API key provided: {OPENAI_KEY}")))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi]);
    let request = GenerationRequest::story(ProviderKind::OpenAi, OPENAI_KEY, "prompt");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("401 should fail");
    assert_eq!(failure.kind, FailureKind::Http);
    assert_eq!(failure.http_status, Some(401));
    assert!(failure.message.contains("OpenAI API error"));
    assert!(!failure.message.contains(OPENAI_KEY));
    server.verify().await;
}

#[tokio::test]
async fn success_without_text_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_json(json!({"content": []})),
        )
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Anthropic]);
    let request = GenerationRequest::story(ProviderKind::Anthropic, ANTHROPIC_KEY, "prompt");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("empty body should fail");
    assert_eq!(failure.kind, FailureKind::EmptyResponse);
    assert_eq!(failure.message, "Anthropic Claude returned an empty response");
}
