use std::fs;
use std::path::Path;
use std::time::Instant;

use lba_core::chunking;
use lba_core::config::AnalysisConfig;
use lba_core::domain::{content_hash, AnalysisResult, Chunk, DocumentMetadata};
use lba_core::error::AppError;
use lba_core::ingest;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use crate::embeddings::Embedder;
use crate::extract;
use crate::index::DocumentIndex;
use crate::llm::Llm;
use crate::rank;

/// The single retrieval query every analysis run uses; not user-supplied.
pub const ANALYSIS_QUERY: &str = "Extract key legal arguments from this document";

/// Linear per-run orchestration: bytes → hash → chunks → index → retrieval →
/// extraction → reconciliation/ranking → result. Each run owns its own
/// `DocumentIndex`; concurrent runs must use independent pipeline instances.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    embedder: Box<dyn Embedder>,
    llm: Option<Box<dyn Llm>>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("config", &self.config)
            .field("has_llm", &self.llm.is_some())
            .finish_non_exhaustive()
    }
}

impl AnalysisPipeline {
    pub fn new(
        config: AnalysisConfig,
        embedder: Box<dyn Embedder>,
        llm: Option<Box<dyn Llm>>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            config,
            embedder,
            llm,
        })
    }

    /// Full run over a PDF on disk. The document id is the content hash of the
    /// raw bytes, so the same file always maps to the same id regardless of
    /// filename.
    pub fn analyze_document(
        &self,
        path: &Path,
        filename: &str,
    ) -> Result<AnalysisResult, AppError> {
        let bytes = fs::read(path).map_err(|e| {
            AppError::new("PDF_NOT_FOUND", "Uploaded PDF not found on server")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(AppError::new("PDF_EMPTY", "Empty PDF file")
                .with_details(format!("path={}", path.display())));
        }
        if !ingest::looks_like_pdf(&bytes) {
            return Err(AppError::new("PDF_INVALID", "File does not look like a PDF")
                .with_details(format!("path={}", path.display())));
        }

        let document_id = content_hash(&bytes);
        info!(document_id = &document_id[..12.min(document_id.len())], "hashed document");

        let (pages, _) = ingest::extract_pages(path)?;
        self.analyze_pages(&pages, &document_id, filename)
    }

    /// Core run over already-extracted per-page text. Split out from
    /// `analyze_document` so the pipeline can be driven without a real PDF.
    pub fn analyze_pages(
        &self,
        pages: &[String],
        document_id: &str,
        document_name: &str,
    ) -> Result<AnalysisResult, AppError> {
        let started = Instant::now();

        let total_pages = pages.len() as u32;
        if total_pages == 0 {
            return Err(AppError::new("PDF_EMPTY", "Document has no pages"));
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        for (i, page_text) in pages.iter().enumerate() {
            let page_number = (i + 1) as u32;
            chunks.extend(chunking::split_page(
                page_text,
                page_number,
                document_id,
                total_pages,
                self.config.chunk_size,
                self.config.chunk_overlap,
            )?);
        }
        if chunks.is_empty() {
            return Err(AppError::new(
                "NO_TEXT_EXTRACTED",
                "No text extracted from PDF",
            ));
        }
        info!(total_pages, total_chunks = chunks.len(), "chunked document");

        // The embedding model's dimension is fixed but only observable through
        // an encode call; probe it with the analysis query.
        let probe = self
            .embedder
            .encode(&self.config.embedding_model, &[ANALYSIS_QUERY.to_string()])?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| {
                AppError::new("EMBEDDINGS_FAILED", "Embedding backend returned no vectors")
            })?;

        let mut index = DocumentIndex::new();
        index.initialize(
            document_id,
            dimension,
            self.config.hnsw_m,
            self.config.hnsw_ef_construction,
        )?;
        index.add_chunks(
            self.embedder.as_ref(),
            &self.config.embedding_model,
            chunks.clone(),
        )?;

        let retrieved = index.search(
            self.embedder.as_ref(),
            &self.config.embedding_model,
            ANALYSIS_QUERY,
            self.config.top_k_retrieval,
            self.config.hnsw_ef_search,
        )?;

        let extraction = extract::analyze_chunks(
            self.llm.as_deref(),
            &self.config.llm_model,
            &retrieved,
            self.config.max_extraction_chunks,
        );
        info!(
            points = extraction.points.len(),
            confidence = extraction.confidence,
            "extraction stage complete"
        );

        let key_points =
            rank::process_and_rank(extraction.points, &chunks, self.config.final_output_count);

        let processing_time = round_to_2dp(started.elapsed().as_secs_f64());
        let analyzed_at = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
            AppError::new("RESULT_BUILD_FAILED", "Failed to format analysis timestamp")
                .with_details(e.to_string())
        })?;

        let total_chunks = chunks.len() as u32;
        info!(processing_time, "analysis complete");

        Ok(AnalysisResult {
            document_id: document_id.to_string(),
            document_name: document_name.to_string(),
            total_pages,
            total_chunks,
            key_points,
            processing_time,
            metadata: DocumentMetadata {
                document_name: document_name.to_string(),
                document_id: document_id.to_string(),
                total_pages,
                total_chunks,
                analyzed_at,
            },
        })
    }
}

fn round_to_2dp(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
