use super::catalog::ProviderKind;
use super::result::GenerationResult;
use crate::generation::{Credential, GenerationRequest};
use crate::prompt;
use std::future::Future;
use std::pin::Pin;

pub type ProviderFuture<'a> = Pin<Box<dyn Future<Output = GenerationResult> + Send + 'a>>;

/// A fully composed provider call: prompts resolved, model and sampling fixed.
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub credential: Credential,
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl ProviderCall {
    pub fn story(request: &GenerationRequest) -> Self {
        let metadata = request.metadata();
        Self::from_parts(
            request,
            prompt::system_prompt(metadata),
            prompt::user_prompt(metadata, request.prompt()),
        )
    }

    pub fn feedback(request: &GenerationRequest) -> Self {
        Self::from_parts(
            request,
            prompt::feedback_system_prompt().to_string(),
            prompt::feedback_prompt(
                request.metadata(),
                request.draft().unwrap_or_default(),
                request.prompt(),
            ),
        )
    }

    fn from_parts(request: &GenerationRequest, system: String, user: String) -> Self {
        Self {
            credential: request.credential().clone(),
            model: request.model().to_string(),
            system,
            user,
            temperature: request.temperature(),
            max_output_tokens: request.max_output_tokens(),
        }
    }
}

/// One provider family's wire protocol.
///
/// Implementations perform a single exchange per call and fold every outcome
/// into a [`GenerationResult`]; they never panic on upstream garbage and never
/// retry on their own (Gemini's alias walk is part of its protocol).
pub trait TransportClient: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn complete<'a>(&'a self, call: &'a ProviderCall) -> ProviderFuture<'a>;

    fn generate_story<'a>(&'a self, request: &'a GenerationRequest) -> ProviderFuture<'a> {
        Box::pin(async move {
            let call = ProviderCall::story(request);
            self.complete(&call).await
        })
    }

    fn request_feedback<'a>(&'a self, request: &'a GenerationRequest) -> ProviderFuture<'a> {
        Box::pin(async move {
            let call = ProviderCall::feedback(request);
            self.complete(&call).await
        })
    }
}
