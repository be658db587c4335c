mod orchestrator;
mod request;

pub use orchestrator::{DEFAULT_GENERATION_TIMEOUT, GenerationOrchestrator};
pub use request::{Credential, DEFAULT_TEMPERATURE, GenerationRequest, GenerationTask};
