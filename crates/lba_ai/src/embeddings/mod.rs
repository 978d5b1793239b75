use lba_core::error::AppError;

/// Batch embedding contract: one normalized fixed-dimension vector per input
/// text, in input order. Fails on an empty input list or backend failure.
pub trait Embedder {
    fn encode(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;
}

pub mod ollama_embed;
