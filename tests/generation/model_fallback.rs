use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer};

use taleforge::generation::GenerationRequest;
use taleforge::providers::{GenerationResult, ProviderKind};

use crate::studio_harness::{
    MISTRAL_KEY, OPENAI_KEY, config_for, error_reply, mistral_reply, openai_reply, orchestrator,
};

fn requested_models(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            body["model"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

#[tokio::test]
async fn missing_model_falls_back_to_default_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({"model": "gpt-4.1"})))
        .respond_with(error_reply(404, "model not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(openai_reply("The second attempt's story."))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi]);
    let request =
        GenerationRequest::story(ProviderKind::OpenAi, OPENAI_KEY, "prompt").with_model("gpt-4.1");
    let result = orchestrator(&config).generate(&request).await;

    let GenerationResult::Success(success) = result else {
        panic!("expected fallback success, got {result:?}");
    };
    assert_eq!(success.content, "The second attempt's story.");
    assert_eq!(success.model, "gpt-4o-mini");

    let received = server.received_requests().await.unwrap();
    assert_eq!(requested_models(&received), ["gpt-4.1", "gpt-4o-mini"]);
    server.verify().await;
}

#[tokio::test]
async fn failed_fallback_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(error_reply(404, "Invalid model: does not exist"))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Mistral]);
    let request = GenerationRequest::story(ProviderKind::Mistral, MISTRAL_KEY, "prompt")
        .with_model("open-mistral-nemo");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("both attempts fail");
    assert_eq!(failure.http_status, Some(404));

    let received = server.received_requests().await.unwrap();
    assert_eq!(
        requested_models(&received),
        ["open-mistral-nemo", "mistral-small-latest"]
    );
    server.verify().await;
}

#[tokio::test]
async fn default_model_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(error_reply(404, "model not found"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Mistral]);
    let request = GenerationRequest::story(ProviderKind::Mistral, MISTRAL_KEY, "prompt");
    let result = orchestrator(&config).generate(&request).await;

    assert!(result.failure().is_some());
    server.verify().await;
}

#[tokio::test]
async fn unrelated_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(error_reply(503, "overloaded, try later"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Mistral]);
    let request = GenerationRequest::story(ProviderKind::Mistral, MISTRAL_KEY, "prompt")
        .with_model("mistral-large-latest");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("503 fails");
    assert_eq!(failure.http_status, Some(503));
    server.verify().await;
}

#[tokio::test]
async fn fallback_success_from_compatible_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "mistral-large-latest"})))
        .respond_with(error_reply(404, "model not found"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "mistral-small-latest"})))
        .respond_with(mistral_reply("Fallback prose."))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Mistral]);
    let request = GenerationRequest::story(ProviderKind::Mistral, MISTRAL_KEY, "prompt")
        .with_model("mistral-large-latest");
    let result = orchestrator(&config).generate(&request).await;

    assert_eq!(result.content(), Some("Fallback prose."));
}
