use crate::error::{CatalogError, ComparisonError};
use crate::providers::{GenerationResult, ProviderKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantStatus {
    Pending,
    Success,
    Error,
}

impl VariantStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One `(provider, model)` pick for a comparison. Parses from `provider[:model]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSelection {
    pub provider: ProviderKind,
    pub model: Option<String>,
}

impl VariantSelection {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());
        self
    }

    /// Model that will be requested: explicit pick or provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(self.provider.descriptor().default_model)
    }
}

impl FromStr for VariantSelection {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = match s.split_once(':') {
            Some((provider, model)) => (provider, Some(model)),
            None => (s, None),
        };
        let provider = ProviderKind::from_str(provider.trim())
            .map_err(|_| CatalogError::UnknownProvider(provider.trim().to_string()))?;
        let selection = Self::new(provider);
        Ok(match model {
            Some(model) => selection.with_model(model),
            None => selection,
        })
    }
}

impl fmt::Display for VariantSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub provider_id: String,
    pub provider_label: String,
    /// Model requested for this variant.
    pub model: String,
    pub status: VariantStatus,
    pub cost_estimate: f64,
    pub estimated_tokens: u32,
    pub tokens_used: Option<u64>,
    pub content: Option<String>,
    pub error: Option<String>,
    /// Model that produced the content, when it differs from the request
    /// (default-model fallback, Gemini revision alias).
    pub resolved_model: Option<String>,
    pub elapsed_ms: Option<u64>,
    pub created_at: String,
}

impl Variant {
    pub(crate) fn pending(selection: &VariantSelection, estimated_tokens: u32) -> Self {
        let descriptor = selection.provider.descriptor();
        Self {
            id: format!("variant_{}", Uuid::new_v4().simple()),
            provider_id: descriptor.id.to_string(),
            provider_label: descriptor.label.to_string(),
            model: selection.model().to_string(),
            status: VariantStatus::Pending,
            cost_estimate: crate::usage::estimate(descriptor.id, u64::from(estimated_tokens)),
            estimated_tokens,
            tokens_used: None,
            content: None,
            error: None,
            resolved_model: None,
            elapsed_ms: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == VariantStatus::Success
    }

    /// Apply a terminal outcome. Returns `false`, leaving the variant untouched,
    /// if it was already terminal.
    pub(crate) fn resolve(&mut self, result: GenerationResult, elapsed: Duration) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.elapsed_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        match result {
            GenerationResult::Success(success) => {
                self.status = VariantStatus::Success;
                self.tokens_used = success.tokens_used;
                self.content = Some(success.content);
                self.resolved_model = (success.model != self.model).then_some(success.model);
            }
            GenerationResult::Failure(failure) => {
                self.status = VariantStatus::Error;
                self.error = Some(failure.message);
            }
        }
        true
    }

    pub(crate) fn abandon(&mut self, reason: &str) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = VariantStatus::Error;
        self.error = Some(reason.to_string());
        true
    }
}

/// Snapshot of a comparison. The variant list is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub id: String,
    pub created_at: String,
    pub prompt: String,
    pub summary: Option<String>,
    pub variants: Vec<Variant>,
    pub winner: Option<String>,
}

impl ComparisonRun {
    pub(crate) fn new(prompt: String, summary: Option<String>, variants: Vec<Variant>) -> Self {
        Self {
            id: format!("comparison_{}", Uuid::new_v4().simple()),
            created_at: Utc::now().to_rfc3339(),
            prompt,
            summary,
            variants,
            winner: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.variants.iter().all(|variant| variant.status.is_terminal())
    }

    pub fn pending_count(&self) -> usize {
        self.variants
            .iter()
            .filter(|variant| !variant.status.is_terminal())
            .count()
    }

    pub fn successful(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|variant| variant.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Variant> {
        self.variants
            .iter()
            .filter(|variant| variant.status == VariantStatus::Error)
    }

    pub fn total_estimated_cost(&self) -> f64 {
        let total: f64 = self.variants.iter().map(|variant| variant.cost_estimate).sum();
        (total * 1000.0).round() / 1000.0
    }

    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    pub fn winner_variant(&self) -> Option<&Variant> {
        self.winner.as_deref().and_then(|id| self.variant(id))
    }

    /// Record `id` as the winner. Returns whether the winner changed.
    pub fn mark_winner(&mut self, id: &str) -> Result<bool, ComparisonError> {
        let variant = self
            .variant(id)
            .ok_or_else(|| ComparisonError::UnknownVariant(id.to_string()))?;
        if !variant.is_success() {
            return Err(ComparisonError::VariantNotSuccessful(id.to_string()));
        }
        if self.winner.as_deref() == Some(id) {
            return Ok(false);
        }
        self.winner = Some(id.to_string());
        Ok(true)
    }
}
