use lba_core::error::AppError;

/// Generative-model contract: one prompt in, raw text out. The pipeline treats
/// this collaborator as optional and recovers locally when it is unavailable.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;
