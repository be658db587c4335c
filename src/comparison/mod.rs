//! Fan one prompt out to two or three `(provider, model)` pairs and collect
//! every outcome independently.

mod run;
mod runner;

pub use run::{ComparisonRun, Variant, VariantSelection, VariantStatus};
pub use runner::{
    ComparisonHandle, ComparisonRequest, ComparisonRunner, MAX_VARIANTS, MIN_VARIANTS, validate,
};
