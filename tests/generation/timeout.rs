use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use taleforge::generation::GenerationRequest;
use taleforge::providers::{FailureKind, ProviderKind};

use crate::studio_harness::{OPENAI_KEY, config_for, openai_reply, orchestrator_with_timeout};

#[tokio::test]
async fn slow_provider_resolves_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(openai_reply("too late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi]);
    let orchestrator = orchestrator_with_timeout(&config, Duration::from_millis(200));
    let request = GenerationRequest::story(ProviderKind::OpenAi, OPENAI_KEY, "prompt");

    let started = Instant::now();
    let result = orchestrator.generate(&request).await;
    let elapsed = started.elapsed();

    let failure = result.failure().expect("should time out");
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.message, "OpenAI request timed out after 200ms");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[tokio::test]
async fn budget_covers_the_fallback_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(
            crate::studio_harness::error_reply(404, "model not found")
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi]);
    let orchestrator = orchestrator_with_timeout(&config, Duration::from_millis(250));
    let request =
        GenerationRequest::story(ProviderKind::OpenAi, OPENAI_KEY, "prompt").with_model("gpt-4.1");

    let result = orchestrator.generate(&request).await;
    let failure = result.failure().expect("budget runs out during fallback");
    assert_eq!(failure.kind, FailureKind::Timeout);
}
