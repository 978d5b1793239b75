use lba_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Embedder;
use crate::ollama::OllamaClient;

/// Texts per request. Batching keeps throughput up without unbounded payloads.
const BATCH_SIZE: usize = 32;

/// Longest input the backend sees per text. Chunking keeps sizes reasonable,
/// but guard anyway.
const MAX_TEXT_CHARS: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl Embedder for OllamaEmbedder {
    fn encode(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Err(AppError::new(
                "EMBEDDINGS_FAILED",
                "No texts provided for encoding",
            ));
        }

        let url = format!("{}/api/embed", self.client.base_url());
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let input: Vec<&str> = batch
                .iter()
                .map(|t| {
                    if t.len() > MAX_TEXT_CHARS {
                        let mut end = MAX_TEXT_CHARS;
                        while !t.is_char_boundary(end) {
                            end -= 1;
                        }
                        &t[..end]
                    } else {
                        t.as_str()
                    }
                })
                .collect();
            let req = EmbedRequest { model, input };

            let resp = ureq::post(&url)
                .timeout(std::time::Duration::from_secs(30))
                .send_json(serde_json::to_value(&req).map_err(|e| {
                    AppError::new("EMBEDDINGS_FAILED", "Failed to encode embeddings request")
                        .with_details(e.to_string())
                })?);

            let rows = match resp {
                Ok(r) if r.status() == 200 => {
                    let v: EmbedResponse = r.into_json().map_err(|e| {
                        AppError::new("EMBEDDINGS_FAILED", "Failed to decode embeddings response")
                            .with_details(e.to_string())
                    })?;
                    v.embeddings
                }
                Ok(r) => {
                    return Err(
                        AppError::new("EMBEDDINGS_FAILED", "Embeddings request failed")
                            .with_details(format!("status={}", r.status())),
                    )
                }
                Err(e) => {
                    return Err(AppError::new(
                        "EMBEDDINGS_FAILED",
                        "Failed to call embeddings endpoint",
                    )
                    .with_details(e.to_string())
                    .with_retryable(true))
                }
            };

            if rows.len() != batch.len() {
                return Err(AppError::new(
                    "EMBEDDINGS_FAILED",
                    "Embeddings response row count does not match input",
                )
                .with_details(format!("expected={}; got={}", batch.len(), rows.len())));
            }
            out.extend(rows);
        }

        debug!(count = out.len(), "generated embeddings");
        Ok(out)
    }
}
