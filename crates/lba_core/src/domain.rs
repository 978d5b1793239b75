use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Provenance attached to every chunk. `page_number` is 1-based and never
/// exceeds `total_pages`; `chunk_index` is 0-based and contiguous within a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub chunk_id: String,
    pub page_number: u32,
    pub document_id: String,
    pub total_pages: u32,
    pub chunk_index: u32,
}

/// One retrievable text unit. Immutable once created; owned by the per-document
/// chunk list for the duration of a single analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Which side the document (or argument) speaks for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Plaintiff,
    Defendant,
    Amicus,
    For,
    Against,
    Neutral,
    Unknown,
}

impl Stance {
    /// Lenient parse: unrecognized values degrade to `Unknown` so one bad
    /// field never fails a whole record.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintiff" => Self::Plaintiff,
            "defendant" => Self::Defendant,
            "amicus" => Self::Amicus,
            "for" => Self::For,
            "against" => Self::Against,
            "neutral" => Self::Neutral,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentCategory {
    Statutory,
    Regulatory,
    Constitutional,
    CaseLaw,
    Procedural,
    Policy,
    Other,
}

impl ArgumentCategory {
    /// Lenient parse mirroring `Stance::parse`; unrecognized values → `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "statutory" => Self::Statutory,
            "regulatory" => Self::Regulatory,
            "constitutional" => Self::Constitutional,
            "case_law" => Self::CaseLaw,
            "procedural" => Self::Procedural,
            "policy" => Self::Policy,
            _ => Self::Other,
        }
    }
}

/// Candidate legal argument as reported by the extraction collaborator.
/// Unvalidated against the source text until reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedPoint {
    pub summary: String,
    pub importance: Option<String>,
    pub importance_score: Option<f32>,
    pub stance: Stance,
    pub supporting_quote: Option<String>,
    pub legal_concepts: Vec<String>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
    pub category: Option<ArgumentCategory>,
    pub retrieval_score: Option<f32>,
}

/// Reconciled, scored, and ranked key point. `final_rank` values form a
/// contiguous 1..N sequence ordered by descending `combined_score`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalKeyPoint {
    pub summary: String,
    pub importance: Option<String>,
    pub importance_score: f32,
    pub stance: Stance,
    pub supporting_quote: Option<String>,
    pub legal_concepts: Vec<String>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
    pub category: Option<ArgumentCategory>,
    pub retrieval_score: f32,
    pub combined_score: f32,
    pub final_rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub document_name: String,
    pub document_id: String,
    pub total_pages: u32,
    pub total_chunks: u32,
    /// RFC3339 UTC.
    pub analyzed_at: String,
}

/// Final payload handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub document_id: String,
    pub document_name: String,
    pub total_pages: u32,
    pub total_chunks: u32,
    pub key_points: Vec<FinalKeyPoint>,
    /// Seconds, rounded to 2 decimals.
    pub processing_time: f64,
    pub metadata: DocumentMetadata,
}

/// Content-addressed document id: identical bytes always map to the same id,
/// independent of filename.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}
