use crate::app::status::{render_providers, render_summary, render_variant};
use crate::cli::commands::{Cli, Commands, StoryArgs};
use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::sync::Arc;
use taleforge::Config;
use taleforge::comparison::{ComparisonRequest, ComparisonRunner, VariantSelection};
use taleforge::generation::{GenerationOrchestrator, GenerationRequest};
use taleforge::prompt::StoryLength;
use taleforge::providers::{AvailabilityCache, ProviderKind, create_registry};
use taleforge::usage;
use tracing::info;

fn build_orchestrator(config: &Config) -> GenerationOrchestrator {
    let availability = Arc::new(AvailabilityCache::new(config.availability.ttl()));
    GenerationOrchestrator::from_config(config, create_registry(config, &availability))
}

fn resolve_temperature(config: &Config, temperature: Option<f64>) -> Result<f64> {
    let temperature = temperature.unwrap_or(config.default_temperature);
    if !(0.0..=2.0).contains(&temperature) {
        bail!("temperature must be between 0.0 and 2.0, got {temperature}");
    }
    Ok(temperature)
}

fn require_credential(
    config: &Config,
    kind: ProviderKind,
) -> Result<taleforge::generation::Credential> {
    config.credentials.for_provider(kind).with_context(|| {
        format!(
            "no credential configured for {kind}; set it in {} or the environment",
            config.config_path.display()
        )
    })
}

async fn run_single(orchestrator: &GenerationOrchestrator, request: GenerationRequest) -> Result<()> {
    let descriptor = request.provider();
    let outcome = orchestrator.generate(&request).await.into_result();
    let success = outcome.map_err(|failure| anyhow::anyhow!(failure.message))?;

    println!("{}", success.content);
    info!(
        provider = descriptor.id,
        model = %success.model,
        tokens_used = success.tokens_used,
        "generation complete"
    );
    Ok(())
}

fn estimate(provider: &str, tokens: Option<u64>, length: Option<StoryLength>) {
    let tokens = tokens
        .or_else(|| length.map(|length| u64::from(length.token_budget())))
        .unwrap_or_default();
    let rates = usage::lookup_rates(provider);
    println!(
        "{provider}: {tokens} tokens ≈ ${:.3} (input ${}/1K, output ${}/1K)",
        usage::estimate(provider, tokens),
        rates.input_per_1k,
        rates.output_per_1k
    );
}

async fn compare(
    config: &Config,
    variants: Vec<VariantSelection>,
    summary: Option<String>,
    temperature: Option<f64>,
    story: &StoryArgs,
    prompt: String,
) -> Result<()> {
    let runner = ComparisonRunner::new(Arc::new(build_orchestrator(config)));
    let request = ComparisonRequest {
        prompt,
        summary,
        metadata: story.metadata(),
        selections: variants,
        temperature: Some(resolve_temperature(config, temperature)?),
        max_output_tokens: story.max_tokens,
    };

    let handle = runner.run(request, &config.credentials.configured())?;
    let mut updates = handle.subscribe();
    let mut printed = HashSet::new();

    loop {
        let run = updates.borrow_and_update().clone();
        for variant in &run.variants {
            if variant.status.is_terminal() && printed.insert(variant.id.clone()) {
                println!("{}", render_variant(variant));
            }
        }
        if run.is_complete() {
            println!("{}", render_summary(&run));
            return Ok(());
        }
        if updates.changed().await.is_err() {
            bail!("comparison {} stopped before completing", run.id);
        }
    }
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Providers => {
            println!("{}", render_providers(&config));
            Ok(())
        }

        Commands::Estimate {
            provider,
            tokens,
            length,
        } => {
            estimate(&provider, tokens, length);
            Ok(())
        }

        Commands::Generate {
            provider,
            model,
            temperature,
            story,
            prompt,
        } => {
            let kind = provider.unwrap_or(config.default_provider);
            let credential = require_credential(&config, kind)?;
            let mut request = GenerationRequest::story(kind, credential, prompt)
                .with_metadata(story.metadata())
                .with_temperature(resolve_temperature(&config, temperature)?);
            if let Some(model) = model {
                request = request.with_model(model);
            }
            run_single(&build_orchestrator(&config), request).await
        }

        Commands::Feedback {
            provider,
            model,
            draft,
            instruction,
            story,
        } => {
            let kind = provider.unwrap_or(config.default_provider);
            let credential = require_credential(&config, kind)?;
            let text = tokio::fs::read_to_string(&draft)
                .await
                .with_context(|| format!("Failed to read draft {}", draft.display()))?;
            if text.trim().is_empty() {
                bail!("draft {} is empty", draft.display());
            }
            let mut request = GenerationRequest::feedback(kind, credential, text, instruction)
                .with_metadata(story.metadata())
                .with_temperature(config.default_temperature);
            if let Some(model) = model {
                request = request.with_model(model);
            }
            run_single(&build_orchestrator(&config), request).await
        }

        Commands::Compare {
            variants,
            summary,
            temperature,
            story,
            prompt,
        } => compare(&config, variants, summary, temperature, &story, prompt).await,
    }
}
