use crate::prompt::StoryMetadata;
use crate::providers::{ProviderDescriptor, ProviderKind};
use std::fmt;

/// Sampling temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Caller-supplied API key. Opaque to the studio; never printed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// What the provider is being asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationTask {
    Story,
    Feedback { draft: String },
}

/// One generation call, owned by whoever dispatches it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    provider: &'static ProviderDescriptor,
    credential: Credential,
    metadata: StoryMetadata,
    prompt: String,
    task: GenerationTask,
    temperature: Option<f64>,
    model: Option<String>,
    max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    /// A story request; `prompt` is the author's prompt, passed through verbatim.
    pub fn story(
        provider: ProviderKind,
        credential: impl Into<Credential>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.descriptor(),
            credential: credential.into(),
            metadata: StoryMetadata::default(),
            prompt: prompt.into(),
            task: GenerationTask::Story,
            temperature: None,
            model: None,
            max_output_tokens: None,
        }
    }

    /// A feedback request on `draft`; `instruction` becomes the prompt text.
    pub fn feedback(
        provider: ProviderKind,
        credential: impl Into<Credential>,
        draft: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            task: GenerationTask::Feedback {
                draft: draft.into(),
            },
            ..Self::story(provider, credential, instruction)
        }
    }

    pub fn with_metadata(mut self, metadata: StoryMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        let trimmed = model.trim();
        self.model = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens).filter(|t| *t > 0);
        self
    }

    pub fn provider(&self) -> &'static ProviderDescriptor {
        self.provider
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn metadata(&self) -> &StoryMetadata {
        &self.metadata
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn task(&self) -> &GenerationTask {
        &self.task
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.task {
            GenerationTask::Feedback { draft } => Some(draft),
            GenerationTask::Story => None,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Explicit override if present, otherwise the provider default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(self.provider.default_model)
    }

    pub fn is_default_model(&self) -> bool {
        self.model() == self.provider.default_model
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
            .unwrap_or_else(|| self.metadata.token_budget())
    }

    /// Same request aimed at a different model.
    pub fn retarget(&self, model: &str) -> Self {
        self.clone().with_model(model)
    }
}
