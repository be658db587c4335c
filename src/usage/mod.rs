pub mod pricing;

pub use pricing::{DEFAULT_RATES, ProviderRates, estimate, lookup_rates, rates_for};
