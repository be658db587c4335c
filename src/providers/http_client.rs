use reqwest::Client;
use std::time::Duration;

/// Build the shared HTTP client for one provider.
///
/// `timeout_secs` is a transport ceiling only; callers keep it above the
/// orchestrator budget so dropped attempts do not leave sockets lingering.
pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!("Falling back to default HTTP client: {error}");
            Client::new()
        })
}
