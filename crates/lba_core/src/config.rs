use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Analysis tuning values. Loading these from the environment (and any secret
/// handling) belongs to the process boundary; this crate only validates ranges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Sliding-window size in characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows on the same page.
    pub chunk_overlap: usize,
    /// How many chunks the vector search returns for the analysis query.
    pub top_k_retrieval: usize,
    /// How many ranked key points the final result keeps.
    pub final_output_count: usize,
    pub embedding_model: String,
    pub llm_model: String,
    /// HNSW graph connectivity (max neighbors per node above level 0).
    pub hnsw_m: usize,
    /// Search breadth while building the graph.
    pub hnsw_ef_construction: usize,
    /// Search breadth while querying the graph.
    pub hnsw_ef_search: usize,
    /// Cap on how many retrieved chunks are handed to the extraction model.
    pub max_extraction_chunks: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
            top_k_retrieval: 60,
            final_output_count: 10,
            embedding_model: "nomic-embed-text".to_string(),
            llm_model: "llama3.1".to_string(),
            hnsw_m: 32,
            hnsw_ef_construction: 64,
            hnsw_ef_search: 64,
            max_extraction_chunks: 30,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(500..=3000).contains(&self.chunk_size) {
            return Err(AppError::new("CONFIG_INVALID", "chunk_size out of range")
                .with_details(format!("chunk_size={}; allowed=500..=3000", self.chunk_size)));
        }
        if self.chunk_overlap > 500 {
            return Err(AppError::new("CONFIG_INVALID", "chunk_overlap out of range")
                .with_details(format!("chunk_overlap={}; allowed=0..=500", self.chunk_overlap)));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(
                AppError::new("CONFIG_INVALID", "chunk_overlap must be smaller than chunk_size")
                    .with_details(format!(
                        "chunk_overlap={}; chunk_size={}",
                        self.chunk_overlap, self.chunk_size
                    )),
            );
        }
        if !(10..=100).contains(&self.top_k_retrieval) {
            return Err(AppError::new("CONFIG_INVALID", "top_k_retrieval out of range")
                .with_details(format!(
                    "top_k_retrieval={}; allowed=10..=100",
                    self.top_k_retrieval
                )));
        }
        if !(5..=20).contains(&self.final_output_count) {
            return Err(AppError::new("CONFIG_INVALID", "final_output_count out of range")
                .with_details(format!(
                    "final_output_count={}; allowed=5..=20",
                    self.final_output_count
                )));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "embedding_model is required"));
        }
        if self.llm_model.trim().is_empty() {
            return Err(AppError::new("CONFIG_INVALID", "llm_model is required"));
        }
        if self.hnsw_m == 0 {
            return Err(AppError::new("CONFIG_INVALID", "hnsw_m must be positive"));
        }
        if self.hnsw_ef_construction == 0 || self.hnsw_ef_search == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "hnsw_ef_construction and hnsw_ef_search must be positive",
            ));
        }
        if self.max_extraction_chunks == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "max_extraction_chunks must be positive",
            ));
        }
        Ok(())
    }
}
