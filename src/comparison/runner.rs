use super::run::{ComparisonRun, Variant, VariantSelection};
use crate::error::ComparisonError;
use crate::generation::{Credential, GenerationOrchestrator, GenerationRequest};
use crate::prompt::StoryMetadata;
use crate::providers::{GenerationResult, ProviderKind};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

pub const MIN_VARIANTS: usize = 2;
pub const MAX_VARIANTS: usize = 3;

const ABANDONED_VARIANT: &str = "variant task ended without reporting a result";

/// Everything needed to fan one prompt out.
#[derive(Debug, Clone, Default)]
pub struct ComparisonRequest {
    pub prompt: String,
    pub summary: Option<String>,
    pub metadata: StoryMetadata,
    pub selections: Vec<VariantSelection>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl ComparisonRequest {
    pub fn new(prompt: impl Into<String>, selections: Vec<VariantSelection>) -> Self {
        Self {
            prompt: prompt.into(),
            selections,
            ..Self::default()
        }
    }

    /// Up-front token budget each variant is estimated against.
    pub fn token_budget(&self) -> u32 {
        self.max_output_tokens
            .filter(|tokens| *tokens > 0)
            .unwrap_or_else(|| self.metadata.token_budget())
    }
}

/// Completion event for one variant slot.
#[derive(Debug)]
struct VariantOutcome {
    index: usize,
    result: GenerationResult,
    elapsed: Duration,
}

/// Reject a comparison before any network traffic.
pub fn validate(
    selections: &[VariantSelection],
    credentials: &BTreeMap<ProviderKind, Credential>,
) -> Result<(), ComparisonError> {
    if selections.len() < MIN_VARIANTS {
        return Err(ComparisonError::TooFewVariants(selections.len()));
    }
    if selections.len() > MAX_VARIANTS {
        return Err(ComparisonError::TooManyVariants(selections.len()));
    }

    let providers: BTreeSet<ProviderKind> = selections.iter().map(|s| s.provider).collect();
    if providers.len() < 2 {
        return Err(ComparisonError::TooFewProviders(providers.len()));
    }

    for provider in providers {
        if credentials.get(&provider).is_none_or(Credential::is_empty) {
            return Err(ComparisonError::MissingCredential {
                provider: provider.id().to_string(),
            });
        }
    }
    Ok(())
}

pub struct ComparisonRunner {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl ComparisonRunner {
    pub fn new(orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Validate, then launch every variant concurrently. Must be called from
    /// within a tokio runtime.
    pub fn run(
        &self,
        request: ComparisonRequest,
        credentials: &BTreeMap<ProviderKind, Credential>,
    ) -> Result<ComparisonHandle, ComparisonError> {
        validate(&request.selections, credentials)?;

        let budget = request.token_budget();
        let variants: Vec<Variant> = request
            .selections
            .iter()
            .map(|selection| Variant::pending(selection, budget))
            .collect();

        let mut jobs = Vec::with_capacity(request.selections.len());
        for selection in &request.selections {
            let credential = credentials
                .get(&selection.provider)
                .cloned()
                .ok_or_else(|| ComparisonError::MissingCredential {
                    provider: selection.provider.id().to_string(),
                })?;
            let mut job = GenerationRequest::story(selection.provider, credential, &request.prompt)
                .with_metadata(request.metadata.clone())
                .with_model(selection.model())
                .with_max_output_tokens(budget);
            if let Some(temperature) = request.temperature {
                job = job.with_temperature(temperature);
            }
            jobs.push(job);
        }

        let run = ComparisonRun::new(request.prompt, request.summary, variants);
        tracing::info!(
            comparison = %run.id,
            variants = run.variants.len(),
            estimated_cost = run.total_estimated_cost(),
            "starting comparison"
        );

        let (state_tx, _) = watch::channel(run);
        let state = Arc::new(state_tx);
        let (events_tx, events_rx) = mpsc::channel(jobs.len());

        for (index, job) in jobs.into_iter().enumerate() {
            let orchestrator = Arc::clone(&self.orchestrator);
            let events = events_tx.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let result = orchestrator.generate(&job).await;
                let outcome = VariantOutcome {
                    index,
                    result,
                    elapsed: started.elapsed(),
                };
                if events.send(outcome).await.is_err() {
                    tracing::debug!(index, "comparison aggregator already stopped");
                }
            });
        }
        drop(events_tx);

        tokio::spawn(aggregate(events_rx, Arc::clone(&state)));

        Ok(ComparisonHandle { state })
    }
}

/// Sole writer of the run snapshot. Applies each outcome to its own slot;
/// once every sender is gone, still-pending slots are closed out as errors.
async fn aggregate(
    mut events: mpsc::Receiver<VariantOutcome>,
    state: Arc<watch::Sender<ComparisonRun>>,
) {
    while let Some(outcome) = events.recv().await {
        let VariantOutcome {
            index,
            result,
            elapsed,
        } = outcome;
        state.send_if_modified(|run| {
            let run_id = run.id.clone();
            let Some(variant) = run.variants.get_mut(index) else {
                tracing::warn!(comparison = %run_id, index, "outcome for unknown variant slot");
                return false;
            };
            let applied = variant.resolve(result, elapsed);
            if applied {
                tracing::info!(
                    comparison = %run_id,
                    variant = %variant.id,
                    provider = %variant.provider_id,
                    status = ?variant.status,
                    elapsed_ms = variant.elapsed_ms,
                    "variant resolved"
                );
            } else {
                tracing::warn!(
                    comparison = %run_id,
                    variant = %variant.id,
                    "ignoring outcome for already resolved variant"
                );
            }
            applied
        });
    }

    state.send_if_modified(|run| {
        let mut changed = false;
        for variant in &mut run.variants {
            if variant.abandon(ABANDONED_VARIANT) {
                tracing::warn!(variant = %variant.id, "variant abandoned");
                changed = true;
            }
        }
        changed
    });
}

/// Caller-side view of a running comparison. Cheap to clone.
#[derive(Clone)]
pub struct ComparisonHandle {
    state: Arc<watch::Sender<ComparisonRun>>,
}

impl ComparisonHandle {
    pub fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    /// Consistent copy of the run as of now.
    pub fn snapshot(&self) -> ComparisonRun {
        self.state.borrow().clone()
    }

    /// Receiver notified on every slot update.
    pub fn subscribe(&self) -> watch::Receiver<ComparisonRun> {
        self.state.subscribe()
    }

    /// Wait until every variant is terminal.
    pub async fn wait(&self) -> ComparisonRun {
        let mut receiver = self.subscribe();
        match receiver.wait_for(ComparisonRun::is_complete).await {
            Ok(run) => run.clone(),
            Err(_) => self.snapshot(),
        }
    }

    pub fn mark_winner(&self, variant_id: &str) -> Result<(), ComparisonError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|run| match run.mark_winner(variant_id) {
            Ok(changed) => changed,
            Err(error) => {
                outcome = Err(error);
                false
            }
        });
        outcome
    }

    /// Mark `variant_id` as winner and hand back its content for the caller's
    /// draft.
    pub fn adopt(&self, variant_id: &str) -> Result<String, ComparisonError> {
        self.mark_winner(variant_id)?;
        self.state
            .borrow()
            .variant(variant_id)
            .and_then(|variant| variant.content.clone())
            .ok_or_else(|| ComparisonError::VariantNotSuccessful(variant_id.to_string()))
    }
}
