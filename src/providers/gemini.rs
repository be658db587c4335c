//! Google Gemini `generateContent` client.
//!
//! The catalog advertises short model names that Google serves under several
//! revision aliases; a request walks those aliases in order until one of them
//! answers with something other than 404. When an [`AvailabilityCache`] is
//! attached, aliases the credential cannot reach are skipped up front.

use super::availability::{AvailabilityCache, ModelProbe, ProbeOutcome};
use super::catalog::{ProviderDescriptor, ProviderKind};
use super::exchange::{non_empty, send_json, transport_failure};
use super::result::{FailureKind, GenerationFailure, GenerationResult, GenerationSuccess};
use super::traits::{ProviderCall, ProviderFuture, TransportClient};
use crate::generation::Credential;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

fn descriptor() -> &'static ProviderDescriptor {
    ProviderKind::Gemini.descriptor()
}

/// Ordered wire names to try for a catalog model.
pub fn expand_model_aliases(model: &str) -> Vec<String> {
    let aliases: &[&str] = match model {
        "gemini-1.5-flash" => &[
            "gemini-1.5-flash-latest",
            "gemini-1.5-flash",
            "gemini-1.5-flash-001",
        ],
        "gemini-1.5-pro" => &[
            "gemini-1.5-pro-latest",
            "gemini-1.5-pro",
            "gemini-1.5-pro-001",
        ],
        "gemini-2.0-flash" => &["gemini-2.0-flash", "gemini-2.0-flash-001"],
        other => return vec![other.to_string()],
    };
    aliases.iter().map(|alias| (*alias).to_string()).collect()
}

/// Every wire name the catalog can expand to, in catalog order.
pub fn catalog_expansion() -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for model in descriptor().models {
        for alias in expand_model_aliases(model) {
            if !names.contains(&alias) {
                names.push(alias);
            }
        }
    }
    names
}

pub struct GeminiClient {
    base_url: String,
    client: Client,
    availability: Option<Arc<AvailabilityCache>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u64>,
}

fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let parts = &response.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts.iter().filter_map(|part| part.text.as_deref()).collect();
    non_empty(&text)
}

impl GeminiClient {
    pub fn new(base_url: Option<&str>, client: Client) -> Self {
        Self {
            base_url: super::normalize_base_url(base_url, DEFAULT_BASE_URL),
            client,
            availability: None,
        }
    }

    /// Skip aliases the credential cannot reach, as recorded in `cache`.
    pub fn with_availability(mut self, cache: Arc<AvailabilityCache>) -> Self {
        self.availability = Some(cache);
        self
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1/models/{model}", self.base_url)
    }

    async fn call_model(&self, call: &ProviderCall, model: &str) -> GenerationResult {
        let label = descriptor().label;
        // No system field on this endpoint; the directive leads the user turn.
        let text = format!("{}\n\n{}", call.system, call.user);
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: &text }],
            }],
            generation_config: GenerationConfig {
                temperature: call.temperature,
                max_output_tokens: call.max_output_tokens,
            },
        };

        let request = self
            .client
            .post(format!("{}:generateContent", self.model_url(model)))
            .query(&[("key", call.credential.expose())])
            .json(&body);

        let raw = match send_json(label, &call.credential, request).await {
            Ok(raw) => raw,
            Err(failure) => return failure.into(),
        };

        let parsed: GenerateContentResponse =
            serde_json::from_value(raw.clone()).unwrap_or_default();
        match extract_text(&parsed) {
            Some(content) => GenerationSuccess {
                content,
                tokens_used: parsed
                    .usage_metadata
                    .and_then(|usage| usage.total_token_count),
                model: model.to_string(),
                raw,
            }
            .into(),
            None => GenerationFailure::empty_response(label, raw).into(),
        }
    }

    async fn call_api(&self, call: &ProviderCall) -> GenerationResult {
        let mut candidates = expand_model_aliases(&call.model);

        if let Some(cache) = &self.availability {
            candidates = match cache
                .filter_available(self, &call.credential, &candidates)
                .await
            {
                Ok(available) => available,
                Err(failure) => return failure.into(),
            };
            if candidates.is_empty() {
                tracing::warn!(model = %call.model, "no reachable Gemini alias for credential");
                return GenerationFailure::new(
                    FailureKind::NoAvailableModel,
                    format!(
                        "{}: no reachable model for this credential (requested {})",
                        descriptor().label, call.model
                    ),
                )
                .into();
            }
        }

        let mut last = None;
        for candidate in &candidates {
            let result = self.call_model(call, candidate).await;
            if !result.failure().is_some_and(GenerationFailure::is_not_found) {
                return result;
            }
            tracing::debug!(model = %candidate, "Gemini alias not found, trying next");
            last = Some(result);
        }

        last.unwrap_or_else(|| {
            GenerationFailure::new(
                FailureKind::NoAvailableModel,
                format!("{}: no model candidates for {}", descriptor().label, call.model),
            )
            .into()
        })
    }
}

/// Only 2xx and client errors other than 429 say anything about the model.
fn probe_verdict(label: &str, status: StatusCode) -> ProbeOutcome {
    if status.is_success() {
        ProbeOutcome::Available
    } else if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        ProbeOutcome::Missing
    } else {
        ProbeOutcome::Unreachable(
            GenerationFailure::new(
                FailureKind::Transport,
                format!(
                    "{label} availability check failed ({status}); try again shortly"
                ),
            )
            .with_status(status.as_u16()),
        )
    }
}

impl ModelProbe for GeminiClient {
    fn probe<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>> {
        Box::pin(async move {
            let label = descriptor().label;
            let response = match self
                .client
                .get(self.model_url(model))
                .query(&[("key", credential.expose())])
                .send()
                .await
            {
                Ok(response) => response,
                Err(error) => {
                    return ProbeOutcome::Unreachable(transport_failure(label, credential, error));
                }
            };
            probe_verdict(label, response.status())
        })
    }

    fn known_models(&self) -> Vec<String> {
        catalog_expansion()
    }
}

impl TransportClient for GeminiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn complete<'a>(&'a self, call: &'a ProviderCall) -> ProviderFuture<'a> {
        Box::pin(self.call_api(call))
    }
}
