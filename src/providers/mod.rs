pub mod anthropic;
pub mod availability;
pub mod catalog;
pub mod compatible;
mod exchange;
pub mod factory;
pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod result;
pub mod scrub;
pub mod traits;

pub use availability::{AvailabilityCache, DEFAULT_AVAILABILITY_TTL, ModelProbe, ProbeOutcome};
pub use catalog::{ProviderDescriptor, ProviderKind};
pub use factory::{ProviderRegistry, create_client, create_registry};
pub use http_client::build_provider_client_with_timeout;
pub use result::{FailureKind, GenerationFailure, GenerationResult, GenerationSuccess};
pub use scrub::{sanitize_api_error, scrub_credential, scrub_secret_patterns};
pub use traits::{ProviderCall, ProviderFuture, TransportClient};

pub(crate) fn normalize_base_url(base_url: Option<&str>, default: &str) -> String {
    base_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}
