use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `taleforge`.
///
/// Generation outcomes are not errors at this level: a failed provider call is
/// a [`GenerationFailure`](crate::providers::GenerationFailure) value carried
/// inside a [`GenerationResult`](crate::providers::GenerationResult). These
/// variants cover caller mistakes and setup problems that stop work before any
/// request is dispatched.
#[derive(Debug, Error)]
pub enum StudioError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Catalog ──────────────────────────────────────────────────────────
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    // ── Comparison ───────────────────────────────────────────────────────
    #[error("comparison: {0}")]
    Comparison(#[from] ComparisonError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Catalog errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
}

// ─── Comparison errors ───────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("a comparison needs at least 2 variants, got {0}")]
    TooFewVariants(usize),

    #[error("a comparison supports at most 3 variants, got {0}")]
    TooManyVariants(usize),

    #[error("a comparison needs at least 2 distinct providers, got {0}")]
    TooFewProviders(usize),

    #[error("no credential configured for provider {provider}")]
    MissingCredential { provider: String },

    #[error("variant {0} is not part of this comparison")]
    UnknownVariant(String),

    #[error("variant {0} has not completed successfully")]
    VariantNotSuccessful(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, StudioError>;
