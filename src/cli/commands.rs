use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taleforge::comparison::VariantSelection;
use taleforge::prompt::{StoryLength, StoryMetadata};
use taleforge::providers::ProviderKind;

/// `taleforge` - multi-provider story generation studio.
#[derive(Parser, Debug)]
#[command(name = "taleforge")]
#[command(version)]
#[command(about = "Generate, critique and compare stories across LLM providers.", long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Story settings shared by every generating command.
#[derive(Args, Debug, Clone, Default)]
pub struct StoryArgs {
    /// Working title
    #[arg(long)]
    pub title: Option<String>,

    /// Genre (fantasy, noir, ...)
    #[arg(long)]
    pub genre: Option<String>,

    /// Tone (whimsical, bleak, ...)
    #[arg(long)]
    pub tone: Option<String>,

    /// Narrative perspective
    #[arg(long)]
    pub perspective: Option<String>,

    /// Length category (short, medium, long)
    #[arg(long)]
    pub length: Option<StoryLength>,

    /// Explicit output-token budget; overrides --length
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl StoryArgs {
    pub fn metadata(&self) -> StoryMetadata {
        StoryMetadata {
            title: self.title.clone(),
            genre: self.genre.clone(),
            tone: self.tone.clone(),
            perspective: self.perspective.clone(),
            length: self.length.unwrap_or_default(),
            target_tokens: self.max_tokens,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported providers, their models and configured credentials
    Providers,

    /// Estimate the cost of a generation without calling any provider
    Estimate {
        /// Provider identifier (unknown identifiers use default rates)
        #[arg(short, long)]
        provider: String,

        /// Token count to price
        #[arg(long, conflicts_with = "length", required_unless_present = "length")]
        tokens: Option<u64>,

        /// Price the budget of a length category instead
        #[arg(long)]
        length: Option<StoryLength>,
    },

    /// Generate a story from a prompt
    Generate {
        /// Provider to use (defaults to config)
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Model to request (defaults to the provider's default)
        #[arg(short, long)]
        model: Option<String>,

        /// Temperature (0.0 - 2.0)
        #[arg(short, long)]
        temperature: Option<f64>,

        #[command(flatten)]
        story: StoryArgs,

        /// Author prompt
        prompt: String,
    },

    /// Ask a provider for editorial feedback on a draft
    Feedback {
        /// Provider to use (defaults to config)
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Model to request
        #[arg(short, long)]
        model: Option<String>,

        /// File holding the draft
        #[arg(long)]
        draft: PathBuf,

        /// What the author wants feedback on
        #[arg(short, long)]
        instruction: String,

        #[command(flatten)]
        story: StoryArgs,
    },

    /// Run one prompt against 2-3 provider/model pairs side by side
    Compare {
        /// Variant as PROVIDER[:MODEL]; repeat 2-3 times
        #[arg(long = "variant", required = true, num_args = 1)]
        variants: Vec<VariantSelection>,

        /// Summary of the story so far
        #[arg(long)]
        summary: Option<String>,

        /// Temperature (0.0 - 2.0)
        #[arg(short, long)]
        temperature: Option<f64>,

        #[command(flatten)]
        story: StoryArgs,

        /// Author prompt
        prompt: String,
    },
}
