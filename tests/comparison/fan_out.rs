use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

use taleforge::comparison::{ComparisonRequest, ComparisonRunner, VariantSelection, VariantStatus};
use taleforge::providers::ProviderKind;

use crate::studio_harness::{
    anthropic_reply, config_for, error_reply, mistral_reply, openai_reply, orchestrator,
};

fn selections(specs: &[&str]) -> Vec<VariantSelection> {
    specs.iter().map(|spec| spec.parse().unwrap()).collect()
}

#[tokio::test]
async fn one_failing_variant_leaves_the_others_intact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(openai_reply("OpenAI draft.").set_delay(Duration::from_millis(80)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(error_reply(500, "overloaded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(mistral_reply("Mistral draft.").set_delay(Duration::from_millis(20)))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(
        &server,
        &[
            ProviderKind::OpenAi,
            ProviderKind::Anthropic,
            ProviderKind::Mistral,
        ],
    );
    let runner = ComparisonRunner::new(Arc::new(orchestrator(&config)));
    let mut request = ComparisonRequest::new(
        "A lighthouse keeper finds a letter",
        selections(&["openai", "anthropic", "mistral"]),
    );
    request.summary = Some("The keeper has been alone for years.".into());

    let handle = runner
        .run(request, &config.credentials.configured())
        .unwrap();
    let run = handle.wait().await;

    assert!(run.is_complete());
    assert_eq!(run.successful().count(), 2);
    assert_eq!(run.failed().count(), 1);
    assert_eq!(run.summary.as_deref(), Some("The keeper has been alone for years."));

    let statuses: Vec<VariantStatus> = run.variants.iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        [VariantStatus::Success, VariantStatus::Error, VariantStatus::Success]
    );
    assert_eq!(run.variants[0].content.as_deref(), Some("OpenAI draft."));
    assert_eq!(run.variants[2].content.as_deref(), Some("Mistral draft."));

    let error = run.variants[1].error.as_deref().unwrap();
    assert!(error.contains("Anthropic Claude API error"));
    assert!(error.contains("overloaded"));
    assert!(run.variants[1].content.is_none());

    server.verify().await;
}

#[tokio::test]
async fn snapshot_exposes_estimates_before_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(openai_reply("slow").set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(anthropic_reply("slow too").set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi, ProviderKind::Anthropic]);
    let runner = ComparisonRunner::new(Arc::new(orchestrator(&config)));
    let handle = runner
        .run(
            ComparisonRequest::new("prompt", selections(&["openai", "anthropic"])),
            &config.credentials.configured(),
        )
        .unwrap();

    let early = handle.snapshot();
    assert_eq!(early.pending_count(), 2);
    // 1500 tokens: openai 0.001125 -> 0.001, anthropic 0.027
    assert!((early.variants[0].cost_estimate - 0.001).abs() < 1e-9);
    assert!((early.variants[1].cost_estimate - 0.027).abs() < 1e-9);
    assert!((early.total_estimated_cost() - 0.028).abs() < 1e-9);

    let done = handle.wait().await;
    assert_eq!(done.pending_count(), 0);
    assert_eq!(done.id, early.id);
}

#[tokio::test]
async fn adopted_variant_becomes_winner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(openai_reply("Version A."))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(mistral_reply("Version B."))
        .mount(&server)
        .await;

    let config = config_for(&server, &[ProviderKind::OpenAi, ProviderKind::Mistral]);
    let runner = ComparisonRunner::new(Arc::new(orchestrator(&config)));
    let handle = runner
        .run(
            ComparisonRequest::new("prompt", selections(&["openai:gpt-4o", "mistral"])),
            &config.credentials.configured(),
        )
        .unwrap();
    let run = handle.wait().await;

    let chosen = run.variants[1].id.clone();
    assert_eq!(handle.adopt(&chosen).unwrap(), "Version B.");
    let after = handle.snapshot();
    assert_eq!(after.winner.as_deref(), Some(chosen.as_str()));
    assert_eq!(
        after.winner_variant().and_then(|v| v.content.as_deref()),
        Some("Version B.")
    );
}
