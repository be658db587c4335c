use super::catalog::ProviderKind;
use super::exchange::{non_empty, send_json};
use super::result::{GenerationFailure, GenerationResult, GenerationSuccess};
use super::traits::{ProviderCall, ProviderFuture, TransportClient};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(base_url: Option<&str>, client: Client) -> Self {
        Self {
            base_url: super::normalize_base_url(base_url, DEFAULT_BASE_URL),
            client,
        }
    }

    async fn call_api(&self, call: &ProviderCall) -> GenerationResult {
        let label = ProviderKind::Anthropic.descriptor().label;
        let body = MessagesRequest {
            model: &call.model,
            max_tokens: call.max_output_tokens,
            temperature: call.temperature,
            system: &call.system,
            messages: [Message {
                role: "user",
                content: [TextBlock {
                    kind: "text",
                    text: &call.user,
                }],
            }],
        };

        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", call.credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let raw = match send_json(label, &call.credential, request).await {
            Ok(raw) => raw,
            Err(failure) => return failure.into(),
        };

        let parsed: MessagesResponse = serde_json::from_value(raw.clone()).unwrap_or_default();
        let text = parsed
            .content
            .first()
            .and_then(|block| block.text.as_deref())
            .and_then(non_empty);

        match text {
            Some(content) => GenerationSuccess {
                content,
                tokens_used: parsed
                    .usage
                    .as_ref()
                    .map(|usage| usage.input_tokens + usage.output_tokens),
                model: call.model.clone(),
                raw,
            }
            .into(),
            None => GenerationFailure::empty_response(label, raw).into(),
        }
    }
}

impl TransportClient for AnthropicClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn complete<'a>(&'a self, call: &'a ProviderCall) -> ProviderFuture<'a> {
        Box::pin(self.call_api(call))
    }
}
