use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Why a provider call did not produce text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No HTTP response reached us (DNS, connect, TLS, proxy).
    Transport,
    /// The provider answered with a non-2xx status.
    Http,
    /// 2xx, but nothing extractable in the body.
    EmptyResponse,
    /// Availability probing found no reachable model for the credential.
    NoAvailableModel,
    /// The orchestrator's wall-clock budget ran out.
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub message: String,
    pub http_status: Option<u16>,
    pub payload: Option<Value>,
}

impl GenerationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            payload: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn transport(label: &str, detail: &str) -> Self {
        Self::new(
            FailureKind::Transport,
            format!(
                "{label} could not be reached: {detail}. Check your network connection \
                 or proxy settings and try again."
            ),
        )
    }

    pub fn empty_response(label: &str, raw: Value) -> Self {
        Self::new(
            FailureKind::EmptyResponse,
            format!("{label} returned an empty response"),
        )
        .with_payload(raw)
    }

    pub fn timeout(label: &str, budget: Duration) -> Self {
        let elapsed = if budget.subsec_millis() == 0 {
            format!("{}s", budget.as_secs())
        } else {
            format!("{}ms", budget.as_millis())
        };
        Self::new(
            FailureKind::Timeout,
            format!("{label} request timed out after {elapsed}"),
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.http_status == Some(404)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSuccess {
    pub content: String,
    pub tokens_used: Option<u64>,
    /// Model that actually produced the content.
    pub model: String,
    pub raw: Value,
}

/// Outcome of one orchestrated provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success(GenerationSuccess),
    Failure(GenerationFailure),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Success(_) => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Success(success) => Some(success.content.as_str()),
            Self::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<GenerationSuccess, GenerationFailure> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<GenerationFailure> for GenerationResult {
    fn from(failure: GenerationFailure) -> Self {
        Self::Failure(failure)
    }
}

impl From<GenerationSuccess> for GenerationResult {
    fn from(success: GenerationSuccess) -> Self {
        Self::Success(success)
    }
}
