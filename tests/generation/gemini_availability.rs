use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taleforge::generation::GenerationRequest;
use taleforge::providers::{FailureKind, GenerationResult, ProviderKind};

use crate::studio_harness::{GEMINI_KEY, config_for, gemini_reply, orchestrator};

async fn lookup_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.method.as_str() == "GET")
        .count()
}

#[tokio::test]
async fn checks_once_then_serves_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models/gemini-1.5-flash-latest"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/models/[^:/]+$"))
        .and(query_param("key", GEMINI_KEY))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", GEMINI_KEY))
        .respond_with(gemini_reply("Salt wind over the cliffs."))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Gemini]);
    let orchestrator = orchestrator(&config);
    let request = GenerationRequest::story(ProviderKind::Gemini, GEMINI_KEY, "prompt");

    let first = orchestrator.generate(&request).await;
    let GenerationResult::Success(success) = first else {
        panic!("expected success, got {first:?}");
    };
    assert_eq!(success.content, "Salt wind over the cliffs.");
    assert_eq!(success.model, "gemini-1.5-flash");
    assert_eq!(success.tokens_used, Some(321));
    let lookups = lookup_count(&server).await;
    assert_eq!(lookups, 8);

    let second = orchestrator.generate(&request).await;
    assert!(second.is_success());
    assert_eq!(lookup_count(&server).await, lookups);
    server.verify().await;
}

#[tokio::test]
async fn unreachable_credential_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Gemini]);
    let request = GenerationRequest::story(ProviderKind::Gemini, GEMINI_KEY, "prompt");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("no model is reachable");
    assert_eq!(failure.kind, FailureKind::NoAvailableModel);
    assert!(failure.message.contains("Google Gemini"));

    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|request| request.method.as_str() == "GET"));
}

#[tokio::test]
async fn unreachable_host_is_transport_failure_without_fallback() {
    let server = MockServer::start().await;
    let mut config = config_for(&server, &[ProviderKind::Gemini]);
    config.endpoints.gemini = Some("http://127.0.0.1:9".into());

    let request = GenerationRequest::story(ProviderKind::Gemini, GEMINI_KEY, "prompt")
        .with_model("gemini-1.5-pro");
    let result = orchestrator(&config).generate(&request).await;

    let failure = result.failure().expect("nothing listens on the port");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert!(failure.message.contains("could not be reached"));
    assert!(!failure.message.contains(GEMINI_KEY));
    assert!(!failure.message.contains("gemini-1.5-flash"));
}

#[tokio::test]
async fn overloaded_lookup_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(8)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/models/[^:/]+$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-1.5-pro-latest:generateContent"))
        .respond_with(gemini_reply("The lamp came back on."))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::Gemini]);
    let orchestrator = orchestrator(&config);
    let request = GenerationRequest::story(ProviderKind::Gemini, GEMINI_KEY, "prompt")
        .with_model("gemini-1.5-pro");

    let first = orchestrator.generate(&request).await;
    let failure = first.failure().expect("every lookup was overloaded");
    assert_eq!(failure.kind, FailureKind::Transport);
    assert_eq!(failure.http_status, Some(503));
    assert_eq!(lookup_count(&server).await, 8);

    let second = orchestrator.generate(&request).await;
    let GenerationResult::Success(success) = second else {
        panic!("expected success once the service recovered, got {second:?}");
    };
    assert_eq!(success.model, "gemini-1.5-pro-latest");
    assert_eq!(lookup_count(&server).await, 16);
    server.verify().await;
}
