use super::catalog::ProviderKind;
use super::exchange::{non_empty, send_json};
use super::result::{GenerationFailure, GenerationResult, GenerationSuccess};
use super::traits::{ProviderCall, ProviderFuture, TransportClient};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI Responses API client.
pub struct OpenAiClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    temperature: f64,
    input: [InputMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: [InputText<'a>; 1],
}

#[derive(Debug, Serialize)]
struct InputText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> InputMessage<'a> {
    fn text(role: &'static str, text: &'a str) -> Self {
        Self {
            role,
            content: [InputText { kind: "text", text }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<OutputText>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    response: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<ResponsesUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OutputText {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesUsage {
    total_tokens: Option<u64>,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

fn concat_items(items: &[OutputItem], include_item_text: bool) -> Option<String> {
    let mut out = String::new();
    for item in items {
        if include_item_text && let Some(text) = &item.text {
            out.push_str(text);
        }
        for content in &item.content {
            if let Some(text) = &content.text {
                out.push_str(text);
            }
        }
    }
    non_empty(&out)
}

fn extract_text(response: &ResponsesResponse) -> Option<String> {
    let top_level = match &response.output_text {
        Some(OutputText::One(text)) => non_empty(text),
        Some(OutputText::Many(parts)) => non_empty(&parts.concat()),
        None => None,
    };

    top_level
        .or_else(|| concat_items(&response.output, true))
        .or_else(|| concat_items(&response.response, false))
}

fn extract_tokens(response: &ResponsesResponse) -> Option<u64> {
    let usage = response.usage.as_ref()?;
    usage.total_tokens.or(match (usage.input_tokens, usage.output_tokens) {
        (None, None) => None,
        (input, output) => Some(input.unwrap_or(0) + output.unwrap_or(0)),
    })
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, client: Client) -> Self {
        Self {
            base_url: super::normalize_base_url(base_url, DEFAULT_BASE_URL),
            client,
        }
    }

    async fn call_api(&self, call: &ProviderCall) -> GenerationResult {
        let label = ProviderKind::OpenAi.descriptor().label;
        let body = ResponsesRequest {
            model: &call.model,
            max_output_tokens: call.max_output_tokens,
            temperature: call.temperature,
            input: [
                InputMessage::text("system", &call.system),
                InputMessage::text("user", &call.user),
            ],
        };

        let request = self
            .client
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(call.credential.expose())
            .json(&body);

        let raw = match send_json(label, &call.credential, request).await {
            Ok(raw) => raw,
            Err(failure) => return failure.into(),
        };

        let parsed: ResponsesResponse = serde_json::from_value(raw.clone()).unwrap_or_default();
        match extract_text(&parsed) {
            Some(content) => GenerationSuccess {
                content,
                tokens_used: extract_tokens(&parsed),
                model: call.model.clone(),
                raw,
            }
            .into(),
            None => GenerationFailure::empty_response(label, raw).into(),
        }
    }
}

impl TransportClient for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn complete<'a>(&'a self, call: &'a ProviderCall) -> ProviderFuture<'a> {
        Box::pin(self.call_api(call))
    }
}
