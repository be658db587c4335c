use super::request::{GenerationRequest, GenerationTask};
use crate::config::Config;
use crate::providers::{
    FailureKind, GenerationFailure, GenerationResult, ProviderRegistry, TransportClient,
};
use std::time::Duration;

pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Drives one request through its provider: requested model first, the
/// provider default at most once more if the model looks unavailable, all of
/// it inside a single wall-clock budget.
pub struct GenerationOrchestrator {
    registry: ProviderRegistry,
    timeout: Duration,
    markers: Vec<String>,
}

impl GenerationOrchestrator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            timeout: DEFAULT_GENERATION_TIMEOUT,
            markers: vec!["model".into(), "does not exist".into()],
        }
    }

    pub fn from_config(config: &Config, registry: ProviderRegistry) -> Self {
        Self::new(registry)
            .with_timeout(config.generation.timeout())
            .with_model_unavailable_markers(config.generation.model_unavailable_markers.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_model_unavailable_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers = markers
            .into_iter()
            .map(|marker| marker.into().trim().to_lowercase())
            .filter(|marker| !marker.is_empty())
            .collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run `request` to a terminal result. Never blocks past the timeout.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let descriptor = request.provider();
        let Some(client) = self.registry.get(descriptor.kind) else {
            return GenerationFailure::new(
                FailureKind::Transport,
                format!("{} is not available in this studio", descriptor.label),
            )
            .into();
        };

        tracing::debug!(
            provider = descriptor.id,
            model = request.model(),
            timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            "dispatching generation"
        );

        match tokio::time::timeout(self.timeout, self.run(client.as_ref(), request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    provider = descriptor.id,
                    model = request.model(),
                    "generation timed out"
                );
                GenerationFailure::timeout(descriptor.label, self.timeout).into()
            }
        }
    }

    async fn run(&self, client: &dyn TransportClient, request: &GenerationRequest) -> GenerationResult {
        let first = attempt(client, request).await;
        let Some(failure) = first.failure() else {
            return first;
        };

        if request.is_default_model() || !self.is_model_unavailable(failure) {
            return first;
        }

        let descriptor = request.provider();
        tracing::warn!(
            provider = descriptor.id,
            requested = request.model(),
            fallback = descriptor.default_model,
            error = %failure.message,
            "model unavailable, retrying with provider default"
        );

        let retry = request.retarget(descriptor.default_model);
        let second = attempt(client, &retry).await;
        if second.is_success() {
            tracing::info!(
                provider = descriptor.id,
                model = descriptor.default_model,
                "fallback model succeeded"
            );
        }
        second
    }

    /// Whether `failure` says the requested model cannot be served.
    pub fn is_model_unavailable(&self, failure: &GenerationFailure) -> bool {
        match failure.kind {
            FailureKind::NoAvailableModel => return true,
            FailureKind::Http => {}
            FailureKind::Transport | FailureKind::EmptyResponse | FailureKind::Timeout => {
                return false;
            }
        }

        if failure.is_not_found() {
            return true;
        }

        let mut haystack = failure.message.to_lowercase();
        if let Some(payload) = &failure.payload {
            haystack.push('\n');
            haystack.push_str(&payload.to_string().to_lowercase());
        }
        self.markers.iter().any(|marker| haystack.contains(marker))
    }
}

async fn attempt(client: &dyn TransportClient, request: &GenerationRequest) -> GenerationResult {
    match request.task() {
        GenerationTask::Story => client.generate_story(request).await,
        GenerationTask::Feedback { .. } => client.request_feedback(request).await,
    }
}
