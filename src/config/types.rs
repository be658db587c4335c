use crate::generation::{Credential, DEFAULT_TEMPERATURE};
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub availability: AvailabilityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            default_provider: default_provider(),
            default_temperature: default_temperature(),
            credentials: CredentialsConfig::default(),
            endpoints: EndpointsConfig::default(),
            generation: GenerationConfig::default(),
            availability: AvailabilityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// API keys per provider. Usually left empty on disk and supplied through
/// environment variables instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistral: Option<String>,
}

impl CredentialsConfig {
    fn slot(&self, kind: ProviderKind) -> &Option<String> {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Mistral => &self.mistral,
        }
    }

    pub fn set(&mut self, kind: ProviderKind, secret: impl Into<String>) {
        let slot = match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::Gemini => &mut self.gemini,
            ProviderKind::Mistral => &mut self.mistral,
        };
        *slot = Some(secret.into());
    }

    /// Non-empty credential for `kind`, if configured.
    pub fn for_provider(&self, kind: ProviderKind) -> Option<Credential> {
        self.slot(kind)
            .as_deref()
            .map(Credential::new)
            .filter(|credential| !credential.is_empty())
    }

    /// Every configured credential, keyed by provider.
    pub fn configured(&self) -> BTreeMap<ProviderKind, Credential> {
        ProviderKind::all()
            .filter_map(|kind| self.for_provider(kind).map(|credential| (kind, credential)))
            .collect()
    }
}

/// Base-URL overrides, e.g. for a proxy or a local mock server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistral: Option<String>,
}

impl EndpointsConfig {
    pub fn for_provider(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_deref(),
            ProviderKind::Anthropic => self.anthropic.as_deref(),
            ProviderKind::Gemini => self.gemini.as_deref(),
            ProviderKind::Mistral => self.mistral.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Wall-clock budget for one request, fallback retry included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Case-insensitive substrings that mark an upstream error as "model unavailable".
    #[serde(default = "default_model_unavailable_markers")]
    pub model_unavailable_markers: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_model_unavailable_markers() -> Vec<String> {
    vec!["model".into(), "does not exist".into()]
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            model_unavailable_markers: default_model_unavailable_markers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl AvailabilityConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl LoggingConfig {
    pub fn max_level(&self) -> tracing::Level {
        self.level
            .trim()
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
