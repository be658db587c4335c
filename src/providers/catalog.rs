//! Static provider registry.
//!
//! Every backend the studio can talk to is described here once. Descriptors are
//! `'static` and never mutated, so lookups need no synchronization.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Provider families with a native wire implementation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ProviderKind {
    /// Responses-style exchange.
    #[strum(to_string = "openai", serialize = "gpt")]
    OpenAi,
    /// Messages exchange with a separate system field.
    #[strum(to_string = "anthropic", serialize = "claude")]
    Anthropic,
    /// Model embedded in the URL, key in the query string.
    #[strum(to_string = "gemini", serialize = "google", serialize = "google-gemini")]
    Gemini,
    /// Chat-completions exchange.
    #[strum(to_string = "mistral", serialize = "mistral-ai")]
    Mistral,
}

impl ProviderKind {
    /// Stable identifier used in config files, rate tables and logs.
    pub fn id(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
        }
    }

    pub fn descriptor(self) -> &'static ProviderDescriptor {
        match self {
            Self::OpenAi => &OPENAI,
            Self::Anthropic => &ANTHROPIC,
            Self::Gemini => &GEMINI,
            Self::Mistral => &MISTRAL,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub id: &'static str,
    pub label: &'static str,
    pub models: &'static [&'static str],
    pub default_model: &'static str,
    pub docs_url: &'static str,
}

impl ProviderDescriptor {
    pub fn supports(&self, model: &str) -> bool {
        self.models.iter().any(|candidate| *candidate == model)
    }
}

const OPENAI: ProviderDescriptor = ProviderDescriptor {
    kind: ProviderKind::OpenAi,
    id: "openai",
    label: "OpenAI",
    models: &["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini", "gpt-4.1"],
    default_model: "gpt-4o-mini",
    docs_url: "https://platform.openai.com/docs/api-reference/responses",
};

const ANTHROPIC: ProviderDescriptor = ProviderDescriptor {
    kind: ProviderKind::Anthropic,
    id: "anthropic",
    label: "Anthropic Claude",
    models: &[
        "claude-3-5-sonnet-latest",
        "claude-3-5-haiku-latest",
        "claude-3-opus-latest",
    ],
    default_model: "claude-3-5-sonnet-latest",
    docs_url: "https://docs.anthropic.com/en/api/messages",
};

const GEMINI: ProviderDescriptor = ProviderDescriptor {
    kind: ProviderKind::Gemini,
    id: "gemini",
    label: "Google Gemini",
    models: &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash"],
    default_model: "gemini-1.5-flash",
    docs_url: "https://ai.google.dev/api/generate-content",
};

const MISTRAL: ProviderDescriptor = ProviderDescriptor {
    kind: ProviderKind::Mistral,
    id: "mistral",
    label: "Mistral",
    models: &[
        "mistral-small-latest",
        "mistral-large-latest",
        "open-mistral-nemo",
    ],
    default_model: "mistral-small-latest",
    docs_url: "https://docs.mistral.ai/api/",
};

/// Look up a descriptor by identifier or alias.
pub fn get(id: &str) -> Result<&'static ProviderDescriptor, CatalogError> {
    ProviderKind::from_str(id.trim())
        .map(ProviderKind::descriptor)
        .map_err(|_| CatalogError::UnknownProvider(id.trim().to_string()))
}

/// All descriptors, in catalog order.
pub fn list() -> Vec<&'static ProviderDescriptor> {
    ProviderKind::all().map(ProviderKind::descriptor).collect()
}
