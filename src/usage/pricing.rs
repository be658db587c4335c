use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Per-1K-token rates for one provider family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderRates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl ProviderRates {
    const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }

    /// Both directions billed on the same token count, rounded to 3 decimals.
    #[must_use]
    pub fn estimate(&self, tokens: u64) -> f64 {
        let cost = (tokens as f64 / 1000.0) * (self.input_per_1k + self.output_per_1k);
        (cost * 1000.0).round() / 1000.0
    }
}

/// Rates for providers outside the catalog.
pub const DEFAULT_RATES: ProviderRates = ProviderRates::new(0.0005, 0.0015);

#[must_use]
pub fn rates_for(kind: ProviderKind) -> ProviderRates {
    match kind {
        ProviderKind::OpenAi => ProviderRates::new(0.000_15, 0.0006),
        ProviderKind::Anthropic => ProviderRates::new(0.003, 0.015),
        ProviderKind::Gemini => ProviderRates::new(0.000_075, 0.0003),
        ProviderKind::Mistral => ProviderRates::new(0.0002, 0.0006),
    }
}

/// Rates for a provider identifier; unknown or custom identifiers get
/// [`DEFAULT_RATES`].
#[must_use]
pub fn lookup_rates(provider_id: &str) -> ProviderRates {
    ProviderKind::from_str(provider_id.trim()).map_or(DEFAULT_RATES, rates_for)
}

/// Projected cost of `tokens` tokens on `provider_id`. Pure; no I/O.
#[must_use]
pub fn estimate(provider_id: &str, tokens: u64) -> f64 {
    lookup_rates(provider_id).estimate(tokens)
}
