use super::anthropic::AnthropicClient;
use super::availability::AvailabilityCache;
use super::catalog::ProviderKind;
use super::compatible::ChatCompletionsClient;
use super::gemini::GeminiClient;
use super::http_client::build_provider_client_with_timeout;
use super::openai::OpenAiClient;
use super::traits::TransportClient;
use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;

/// One transport client per provider family.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<ProviderKind, Arc<dyn TransportClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` under its own kind, replacing any previous entry.
    pub fn register(&mut self, client: Arc<dyn TransportClient>) {
        self.clients.insert(client.kind(), client);
    }

    pub fn with(mut self, client: Arc<dyn TransportClient>) -> Self {
        self.register(client);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn TransportClient>> {
        self.clients.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Transport ceiling kept well above the orchestrator budget.
fn transport_timeout_secs(config: &Config) -> u64 {
    config.generation.timeout_secs.saturating_mul(2).max(30)
}

/// Build the client for one provider.
pub fn create_client(
    kind: ProviderKind,
    config: &Config,
    availability: &Arc<AvailabilityCache>,
) -> Arc<dyn TransportClient> {
    let base_url = config.endpoints.for_provider(kind);
    let client = build_provider_client_with_timeout(transport_timeout_secs(config));
    match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(base_url, client)),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(base_url, client)),
        ProviderKind::Gemini => Arc::new(
            GeminiClient::new(base_url, client).with_availability(Arc::clone(availability)),
        ),
        ProviderKind::Mistral => Arc::new(ChatCompletionsClient::mistral(base_url, client)),
    }
}

/// Registry with every catalog provider, sharing one availability cache.
pub fn create_registry(config: &Config, availability: &Arc<AvailabilityCache>) -> ProviderRegistry {
    ProviderKind::all().fold(ProviderRegistry::new(), |registry, kind| {
        registry.with(create_client(kind, config, availability))
    })
}
