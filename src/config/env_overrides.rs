use super::Config;
use crate::providers::ProviderKind;
use std::str::FromStr;

/// Environment variables holding provider keys, in lookup order.
fn credential_env_vars(kind: ProviderKind) -> &'static [&'static str] {
    match kind {
        ProviderKind::OpenAi => &["OPENAI_API_KEY"],
        ProviderKind::Anthropic => &["ANTHROPIC_API_KEY"],
        ProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        ProviderKind::Mistral => &["MISTRAL_API_KEY"],
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        for kind in ProviderKind::all() {
            if let Some(key) = credential_env_vars(kind)
                .iter()
                .find_map(|var| non_empty_env(var))
            {
                self.credentials.set(kind, key);
            }
        }

        if let Some(provider) = non_empty_env("TALEFORGE_PROVIDER") {
            match ProviderKind::from_str(&provider) {
                Ok(kind) => self.default_provider = kind,
                Err(_) => tracing::warn!(provider = %provider, "ignoring unknown TALEFORGE_PROVIDER"),
            }
        }

        if let Some(secs) = non_empty_env("TALEFORGE_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.generation.timeout_secs = secs;
        }

        if let Some(temp_str) = non_empty_env("TALEFORGE_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.default_temperature = temp;
        }

        if let Some(level) = non_empty_env("TALEFORGE_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
