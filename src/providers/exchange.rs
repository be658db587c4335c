use super::result::{FailureKind, GenerationFailure};
use super::scrub::{sanitize_api_error, scrub_credential};
use crate::generation::Credential;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::error::Error as _;

/// JSON paths probed, in order, for a human-readable upstream error.
const ERROR_DETAIL_POINTERS: [&str; 4] = ["/error/message", "/error/detail", "/message", "/detail"];

/// Send one request and return the parsed 2xx body.
///
/// Transport failures, non-2xx statuses and non-JSON success bodies are all
/// folded into a [`GenerationFailure`] with scrubbed text.
pub(crate) async fn send_json(
    label: &str,
    credential: &Credential,
    request: RequestBuilder,
) -> Result<Value, GenerationFailure> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(error) => return Err(transport_failure(label, credential, error)),
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => return Err(transport_failure(label, credential, error)),
    };
    let parsed = serde_json::from_str::<Value>(&body).ok();

    if !status.is_success() {
        let detail = parsed
            .as_ref()
            .and_then(extract_error_detail)
            .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("no detail").to_string());
        let detail = sanitize_api_error(&scrub_credential(&detail, credential.expose()));
        tracing::debug!(provider = label, status = status.as_u16(), "provider returned error status");
        return Err(GenerationFailure::new(
            FailureKind::Http,
            format!("{label} API error ({status}): {detail}"),
        )
        .with_status(status.as_u16())
        .with_payload(parsed.unwrap_or(Value::String(sanitize_api_error(&body)))));
    }

    parsed.ok_or_else(|| {
        GenerationFailure::empty_response(label, Value::String(sanitize_api_error(&body)))
    })
}

pub(crate) fn transport_failure(label: &str, credential: &Credential, error: reqwest::Error) -> GenerationFailure {
    let error = error.without_url();
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    let detail = sanitize_api_error(&scrub_credential(&detail, credential.expose()));
    tracing::debug!(provider = label, error = %detail, "provider transport failure");
    GenerationFailure::transport(label, &detail)
}

pub(crate) fn extract_error_detail(payload: &Value) -> Option<String> {
    ERROR_DETAIL_POINTERS
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .chain(payload.get("error"))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
