use lba_core::domain::Chunk;
use lba_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embeddings::Embedder;

pub mod hnsw;

use hnsw::HnswGraph;

/// Sentinel distance substituted for non-finite values coming back from the
/// ANN engine; maps to a similarity of ~0.
const BAD_DISTANCE_SENTINEL: f32 = 1e6;

/// One search hit: a chunk plus its bounded retrieval score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub retrieval_score: f32,
}

/// Per-document vector index: one HNSW graph plus the chunk list it indexes.
///
/// Graph ordinal `i` always corresponds to `chunks[i]`; `add_chunks` appends
/// to both in the same order to preserve that alignment. At most one document
/// is live at a time; `initialize` unconditionally replaces prior state.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    graph: Option<HnswGraph>,
    chunks: Vec<Chunk>,
    document_id: Option<String>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Force-recreate semantics: any prior graph and chunk list are discarded.
    pub fn initialize(
        &mut self,
        document_id: &str,
        dimension: usize,
        m: usize,
        ef_construction: usize,
    ) -> Result<(), AppError> {
        if dimension == 0 {
            return Err(AppError::new(
                "INDEX_INIT_FAILED",
                "Embedding dimension must be positive",
            ));
        }
        self.graph = Some(HnswGraph::new(dimension, m, ef_construction));
        self.chunks = Vec::new();
        self.document_id = Some(document_id.to_string());
        info!(document_id, dimension, "initialized vector index");
        Ok(())
    }

    /// Encodes the chunk texts in one batch and appends vectors and chunk
    /// records in the same order.
    pub fn add_chunks(
        &mut self,
        embedder: &dyn Embedder,
        model: &str,
        chunks: Vec<Chunk>,
    ) -> Result<(), AppError> {
        let graph = self.graph.as_mut().ok_or_else(|| {
            AppError::new(
                "INDEX_NOT_INITIALIZED",
                "Index not initialized; call initialize first",
            )
        })?;
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.encode(model, &texts)?;
        if vectors.len() != chunks.len() {
            return Err(AppError::new(
                "EMBEDDINGS_FAILED",
                "Embedding count does not match chunk count",
            )
            .with_details(format!("chunks={}; vectors={}", chunks.len(), vectors.len())));
        }

        graph.add(vectors)?;
        let added = chunks.len();
        self.chunks.extend(chunks);
        info!(added, total = self.chunks.len(), "added chunks to vector store");
        Ok(())
    }

    /// Single-query top-k retrieval. Returns an empty list (not an error) when
    /// the index is empty or uninitialized; result order follows the ANN
    /// engine's order.
    pub fn search(
        &self,
        embedder: &dyn Embedder,
        model: &str,
        query: &str,
        top_k: usize,
        ef_search: usize,
    ) -> Result<Vec<RetrievedChunk>, AppError> {
        let Some(graph) = self.graph.as_ref() else {
            warn!("search on uninitialized index; returning no chunks");
            return Ok(Vec::new());
        };
        if self.chunks.is_empty() {
            warn!("no chunks in index");
            return Ok(Vec::new());
        }

        let query_vectors = embedder.encode(model, &[query.to_string()])?;
        let query_vector = query_vectors.first().ok_or_else(|| {
            AppError::new("EMBEDDINGS_FAILED", "Embedding backend returned no query vector")
        })?;

        let k = top_k.min(self.chunks.len());
        let hits = graph
            .search(query_vector, k, ef_search)
            .map_err(|e| {
                AppError::new("SEARCH_FAILED", "Vector search failed")
                    .with_details(format!("{e}"))
            })?;

        let mut results = Vec::with_capacity(hits.len());
        for (distance, ordinal) in hits {
            let Some(chunk) = self.chunks.get(ordinal) else {
                continue;
            };
            results.push(RetrievedChunk {
                chunk: chunk.clone(),
                retrieval_score: distance_to_similarity(distance),
            });
        }

        debug!(retrieved = results.len(), "retrieved chunks for query");
        Ok(results)
    }
}

/// Bounded similarity from an unbounded non-negative distance: `1 / (1 + d)`
/// maps 0 → 1 and grows toward 0 monotonically. Non-finite distances are
/// replaced with a large sentinel and negative ones (numerical noise) are
/// clamped to 0 first; the result is clamped to [0, 1].
pub fn distance_to_similarity(distance: f32) -> f32 {
    let d = if distance.is_finite() {
        distance.max(0.0)
    } else {
        BAD_DISTANCE_SENTINEL
    };
    (1.0 / (1.0 + d)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_is_bounded_and_monotone() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
        assert!(distance_to_similarity(BAD_DISTANCE_SENTINEL) < 1e-5);
        assert_eq!(distance_to_similarity(f32::NAN), distance_to_similarity(f32::INFINITY));
        assert_eq!(distance_to_similarity(-0.5), 1.0);
        for d in [0.01f32, 0.5, 1.0, 10.0, 1e5] {
            let s = distance_to_similarity(d);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
