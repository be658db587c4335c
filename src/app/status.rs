use taleforge::Config;
use taleforge::comparison::{ComparisonRun, Variant, VariantStatus};
use taleforge::providers::catalog;

pub fn render_providers(config: &Config) -> String {
    let configured = config.credentials.configured();
    let mut lines = vec![
        format!("◆ taleforge {}", env!("CARGO_PKG_VERSION")),
        format!("  config      {}", config.config_path.display()),
        format!("  default     {}", config.default_provider),
        String::new(),
    ];

    for descriptor in catalog::list() {
        let key = if configured.contains_key(&descriptor.kind) {
            "key configured"
        } else {
            "no key"
        };
        lines.push(format!("  {:<10} {} ({key})", descriptor.id, descriptor.label));
        lines.push(format!("             default  {}", descriptor.default_model));
        lines.push(format!("             models   {}", descriptor.models.join(", ")));
        if let Some(endpoint) = config.endpoints.for_provider(descriptor.kind) {
            lines.push(format!("             endpoint {endpoint}"));
        }
    }

    lines.join("\n")
}

pub fn render_variant(variant: &Variant) -> String {
    let model = match &variant.resolved_model {
        Some(resolved) => format!("{} -> {resolved}", variant.model),
        None => variant.model.clone(),
    };
    let elapsed = variant
        .elapsed_ms
        .map(|ms| format!(" in {ms}ms"))
        .unwrap_or_default();
    let header = format!(
        "── {} [{} {model}]{elapsed} est. ${:.3}",
        variant.id, variant.provider_label, variant.cost_estimate
    );

    match variant.status {
        VariantStatus::Success => {
            let tokens = variant
                .tokens_used
                .map(|t| format!("\n({t} tokens)"))
                .unwrap_or_default();
            format!(
                "{header}\n{}{tokens}\n",
                variant.content.as_deref().unwrap_or_default()
            )
        }
        VariantStatus::Error => format!(
            "{header}\nerror: {}\n",
            variant.error.as_deref().unwrap_or("unknown error")
        ),
        VariantStatus::Pending => format!("{header}\n(pending)\n"),
    }
}

pub fn render_summary(run: &ComparisonRun) -> String {
    format!(
        "◆ {}: {} succeeded, {} failed, estimated total ${:.3}",
        run.id,
        run.successful().count(),
        run.failed().count(),
        run.total_estimated_cost()
    )
}
