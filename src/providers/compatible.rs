//! Chat-completions wire format. Mistral speaks it natively; any other
//! OpenAI-compatible endpoint would reuse this client with its own kind.

use super::catalog::ProviderKind;
use super::exchange::{non_empty, send_json};
use super::result::{GenerationFailure, GenerationResult, GenerationSuccess};
use super::traits::{ProviderCall, ProviderFuture, TransportClient};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

pub struct ChatCompletionsClient {
    kind: ProviderKind,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: Option<u64>,
}

impl ChatCompletionsClient {
    pub fn new(kind: ProviderKind, base_url: &str, client: Client) -> Self {
        Self {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn mistral(base_url: Option<&str>, client: Client) -> Self {
        Self::new(
            ProviderKind::Mistral,
            &super::normalize_base_url(base_url, MISTRAL_BASE_URL),
            client,
        )
    }

    async fn call_api(&self, call: &ProviderCall) -> GenerationResult {
        let label = self.kind.descriptor().label;
        let body = ChatRequest {
            model: &call.model,
            temperature: call.temperature,
            max_tokens: call.max_output_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &call.system,
                },
                ChatMessage {
                    role: "user",
                    content: &call.user,
                },
            ],
        };

        let request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(call.credential.expose())
            .json(&body);

        let raw = match send_json(label, &call.credential, request).await {
            Ok(raw) => raw,
            Err(failure) => return failure.into(),
        };

        let parsed: ChatResponse = serde_json::from_value(raw.clone()).unwrap_or_default();
        let text = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .and_then(non_empty);

        match text {
            Some(content) => GenerationSuccess {
                content,
                tokens_used: parsed.usage.and_then(|usage| usage.total_tokens),
                model: call.model.clone(),
                raw,
            }
            .into(),
            None => GenerationFailure::empty_response(label, raw).into(),
        }
    }
}

impl TransportClient for ChatCompletionsClient {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn complete<'a>(&'a self, call: &'a ProviderCall) -> ProviderFuture<'a> {
        Box::pin(self.call_api(call))
    }
}
