use lba_core::domain::{ArgumentCategory, ExtractedPoint, Stance};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::index::RetrievedChunk;
use crate::llm::Llm;

pub mod prompts;
pub mod recovery;

/// Confidence assumed when the model returned parseable output but omitted
/// the overall confidence field.
const DEFAULT_CONFIDENCE: f32 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionOutput {
    pub points: Vec<ExtractedPoint>,
    pub confidence: f32,
}

impl ExtractionOutput {
    fn empty() -> Self {
        Self {
            points: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Extracts candidate legal arguments from retrieved chunks.
///
/// This never fails the run: an unavailable collaborator, a generation
/// failure, or unparseable output all degrade to zero points with confidence
/// 0, and individually invalid records are dropped while the rest survive.
pub fn analyze_chunks(
    llm: Option<&dyn Llm>,
    model: &str,
    retrieved: &[RetrievedChunk],
    max_chunks: usize,
) -> ExtractionOutput {
    let Some(llm) = llm else {
        warn!("extraction backend unavailable; returning empty analysis result");
        return ExtractionOutput::empty();
    };

    let bundle = &retrieved[..retrieved.len().min(max_chunks)];
    let context = prepare_context(bundle);
    let prompt = prompts::extraction_prompt(&context);

    let response = match llm.generate(model, &prompt) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "extraction call failed; continuing with empty result");
            return ExtractionOutput::empty();
        }
    };

    let Some(parsed) = recovery::parse_json_response(&response) else {
        warn!("failed to parse extraction response as JSON");
        return ExtractionOutput::empty();
    };

    let records = parsed
        .get("arguments")
        .or_else(|| parsed.get("extracted_points"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut points = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        // Anchor on the originating chunk's retrieval score; records past the
        // bundle get a neutral 0.5.
        let anchor = bundle.get(i).map(|r| r.retrieval_score).unwrap_or(0.5);
        match coerce_point(record, anchor) {
            Some(point) => points.push(point),
            None => warn!(index = i, "skipping invalid extracted record"),
        }
    }

    let confidence = parsed
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    info!(extracted = points.len(), "extracted legal arguments");
    ExtractionOutput { points, confidence }
}

/// Labeled-excerpt bundle handed to the model, one block per chunk.
fn prepare_context(retrieved: &[RetrievedChunk]) -> String {
    let mut parts = Vec::with_capacity(retrieved.len());
    for (i, hit) in retrieved.iter().enumerate() {
        parts.push(format!(
            "[Chunk {}, Page {}]:\n{}\n",
            i + 1,
            hit.chunk.metadata.page_number,
            hit.chunk.text
        ));
    }
    parts.join("\n")
}

/// Per-record coercion. Returns `None` only when the record has no usable
/// summary; every other bad field degrades instead of failing the record.
fn coerce_point(record: &Value, retrieval_anchor: f32) -> Option<ExtractedPoint> {
    let summary = record
        .get("summary")
        .or_else(|| record.get("argument"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let importance = record
        .get("importance")
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    let importance_score = record
        .get("importance_score")
        .and_then(Value::as_f64)
        .map(|v| (v as f32).clamp(0.0, 1.0))
        .unwrap_or(0.5);

    let stance = record
        .get("stance")
        .and_then(Value::as_str)
        .map(Stance::parse)
        .unwrap_or(Stance::Unknown);

    let supporting_quote = record
        .get("supporting_quote")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let legal_concepts = record
        .get("legal_concepts")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    let page_start = record
        .get("page_start")
        .or_else(|| record.get("page_number"))
        .and_then(Value::as_u64)
        .filter(|p| *p >= 1)
        .map(|p| p as u32);

    let page_end = record
        .get("page_end")
        .and_then(Value::as_u64)
        .filter(|p| *p >= 1)
        .map(|p| p as u32);

    let category = record
        .get("category")
        .and_then(Value::as_str)
        .map(ArgumentCategory::parse);

    let retrieval_score = record
        .get("retrieval_score")
        .and_then(Value::as_f64)
        .map(|v| (v as f32).clamp(0.0, 1.0))
        .unwrap_or(retrieval_anchor);

    Some(ExtractedPoint {
        summary,
        importance,
        importance_score: Some(importance_score),
        stance,
        supporting_quote,
        legal_concepts,
        page_start,
        page_end,
        category,
        retrieval_score: Some(retrieval_score),
    })
}
