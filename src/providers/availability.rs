use super::result::GenerationFailure;
use crate::generation::Credential;
use futures_util::future::join_all;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const DEFAULT_AVAILABILITY_TTL: Duration = Duration::from_secs(3600);

/// Verdict of one existence check.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The provider confirmed the model for this credential.
    Available,
    /// The provider answered and refused the model (4xx).
    Missing,
    /// No verdict: the request never completed, or the provider was
    /// overloaded or rate limiting. Never cached.
    Unreachable(GenerationFailure),
}

/// Lightweight existence check for one model under one credential.
pub trait ModelProbe: Send + Sync {
    fn probe<'a>(
        &'a self,
        credential: &'a Credential,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + 'a>>;

    /// Models probed alongside the caller's candidates on a cache miss, so
    /// later requests within the TTL are answered without network I/O.
    fn known_models(&self) -> Vec<String> {
        Vec::new()
    }
}

struct CacheEntry {
    available: HashSet<String>,
    probed: HashSet<String>,
    checked_at: Instant,
}

/// Per-credential record of which models answered a probe.
///
/// Credentials are keyed by their SHA-256 digest; the raw secret is never
/// stored. Concurrent misses may both re-probe, the last writer wins.
pub struct AvailabilityCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

fn fingerprint(credential: &Credential) -> String {
    hex::encode(Sha256::digest(credential.expose().as_bytes()))
}

/// Probe every model concurrently. Any round without a verdict for every
/// model fails as a whole so nothing partial reaches the cache.
async fn probe_all(
    probe: &dyn ModelProbe,
    credential: &Credential,
    models: &[String],
) -> Result<HashSet<String>, GenerationFailure> {
    let checks = models.iter().map(|model| async move {
        let outcome = probe.probe(credential, model).await;
        tracing::debug!(model = %model, outcome = ?outcome, "model availability probe");
        (model, outcome)
    });

    let mut available = HashSet::new();
    for (model, outcome) in join_all(checks).await {
        match outcome {
            ProbeOutcome::Available => {
                available.insert(model.clone());
            }
            ProbeOutcome::Missing => {}
            ProbeOutcome::Unreachable(failure) => {
                tracing::warn!(model = %model, error = %failure.message, "availability probe got no verdict");
                return Err(failure);
            }
        }
    }
    Ok(available)
}

impl AvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Subset of `candidates` reachable with `credential`, order preserved.
    ///
    /// Fails with the probe's failure when any probe in the round got no
    /// verdict; the cache is left untouched in that case.
    pub async fn filter_available(
        &self,
        probe: &dyn ModelProbe,
        credential: &Credential,
        candidates: &[String],
    ) -> Result<Vec<String>, GenerationFailure> {
        let key = fingerprint(credential);

        let unprobed = {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.checked_at.elapsed() < self.ttl => {
                    let unprobed: Vec<String> = candidates
                        .iter()
                        .filter(|model| !entry.probed.contains(*model))
                        .cloned()
                        .collect();
                    if unprobed.is_empty() {
                        return Ok(retain_available(candidates, &entry.available));
                    }
                    Some(unprobed)
                }
                _ => None,
            }
        };

        match unprobed {
            // Fresh entry that has never seen some of these names: probe only those.
            Some(unprobed) => {
                let reachable = probe_all(probe, credential, &unprobed).await?;
                let mut entries = self.entries.write().await;
                let entry = entries.entry(key).or_insert_with(|| CacheEntry {
                    available: HashSet::new(),
                    probed: HashSet::new(),
                    checked_at: Instant::now(),
                });
                entry.probed.extend(unprobed);
                entry.available.extend(reachable);
                Ok(retain_available(candidates, &entry.available))
            }
            None => {
                let mut models = probe.known_models();
                for candidate in candidates {
                    if !models.contains(candidate) {
                        models.push(candidate.clone());
                    }
                }
                let available = probe_all(probe, credential, &models).await?;
                tracing::info!(
                    probed = models.len(),
                    available = available.len(),
                    "refreshed model availability"
                );
                let filtered = retain_available(candidates, &available);
                self.entries.write().await.insert(
                    key,
                    CacheEntry {
                        available,
                        probed: models.into_iter().collect(),
                        checked_at: Instant::now(),
                    },
                );
                Ok(filtered)
            }
        }
    }

    /// Forget everything cached for `credential`.
    pub async fn invalidate(&self, credential: &Credential) {
        self.entries.write().await.remove(&fingerprint(credential));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new(DEFAULT_AVAILABILITY_TTL)
    }
}

fn retain_available(candidates: &[String], available: &HashSet<String>) -> Vec<String> {
    candidates
        .iter()
        .filter(|model| available.contains(*model))
        .cloned()
        .collect()
}
