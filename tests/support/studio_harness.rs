#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

use taleforge::Config;
use taleforge::generation::GenerationOrchestrator;
use taleforge::providers::{AvailabilityCache, ProviderKind, create_registry};

pub const OPENAI_KEY: &str = "sk-test-openai";
pub const ANTHROPIC_KEY: &str = "sk-ant-test";
pub const GEMINI_KEY: &str = "AIza-test";
pub const MISTRAL_KEY: &str = "mistral-test";

/// Config with every provider pointed at `server` and the given keys set.
pub fn config_for(server: &MockServer, keyed: &[ProviderKind]) -> Config {
    let mut config = Config::default();
    let uri = server.uri();
    config.endpoints.openai = Some(uri.clone());
    config.endpoints.anthropic = Some(uri.clone());
    config.endpoints.gemini = Some(uri.clone());
    config.endpoints.mistral = Some(uri);

    for kind in keyed {
        let key = match kind {
            ProviderKind::OpenAi => OPENAI_KEY,
            ProviderKind::Anthropic => ANTHROPIC_KEY,
            ProviderKind::Gemini => GEMINI_KEY,
            ProviderKind::Mistral => MISTRAL_KEY,
        };
        config.credentials.set(*kind, key);
    }
    config
}

pub fn orchestrator(config: &Config) -> GenerationOrchestrator {
    let availability = Arc::new(AvailabilityCache::new(config.availability.ttl()));
    GenerationOrchestrator::from_config(config, create_registry(config, &availability))
}

pub fn orchestrator_with_timeout(config: &Config, timeout: Duration) -> GenerationOrchestrator {
    orchestrator(config).with_timeout(timeout)
}

pub fn openai_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "resp_test",
        "output_text": [text],
        "usage": {"input_tokens": 120, "output_tokens": 340, "total_tokens": 460}
    }))
}

pub fn anthropic_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_test",
        "type": "message",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 100, "output_tokens": 250}
    }))
}

pub fn mistral_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "cmpl_test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
        "usage": {"prompt_tokens": 90, "completion_tokens": 200, "total_tokens": 290}
    }))
}

pub fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
        "usageMetadata": {"totalTokenCount": 321}
    }))
}

pub fn error_reply(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"error": {"message": message}}))
}
