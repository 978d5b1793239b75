use lba_ai::extract::analyze_chunks;
use lba_ai::index::RetrievedChunk;
use lba_ai::llm::Llm;
use lba_core::domain::{ArgumentCategory, Chunk, ChunkMetadata, Stance};
use lba_core::error::AppError;
use pretty_assertions::assert_eq;

/// Replays a canned response, or fails when constructed with `Err`.
struct CannedLlm(Result<String, String>);

impl CannedLlm {
    fn ok(response: &str) -> Self {
        Self(Ok(response.to_string()))
    }

    fn failing() -> Self {
        Self(Err("model not loaded".to_string()))
    }
}

impl Llm for CannedLlm {
    fn generate(&self, _model: &str, _prompt: &str) -> Result<String, AppError> {
        match &self.0 {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(AppError::new("EXTRACTION_FAILED", msg).with_retryable(true)),
        }
    }
}

fn retrieved(text: &str, page: u32, score: f32) -> RetrievedChunk {
    RetrievedChunk {
        chunk: Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                chunk_id: format!("doc_page{page}_chunk0"),
                page_number: page,
                document_id: "doc".to_string(),
                total_pages: 3,
                chunk_index: 0,
            },
        },
        retrieval_score: score,
    }
}

const CLEAN_RESPONSE: &str = r#"{
  "arguments": [
    {
      "summary": "The statute of limitations bars the claim",
      "importance": "Dispositive if accepted",
      "importance_score": 0.9,
      "stance": "defendant",
      "supporting_quote": "the claim is time-barred",
      "legal_concepts": ["statute of limitations"],
      "page_start": 2,
      "category": "procedural"
    },
    {
      "summary": "Equitable tolling applies",
      "importance_score": 0.7,
      "stance": "plaintiff",
      "category": "case_law",
      "page_start": 1
    }
  ],
  "confidence": 0.85
}"#;

#[test]
fn parses_clean_json_output() {
    let hits = vec![retrieved("chunk one", 2, 0.8), retrieved("chunk two", 1, 0.6)];
    let llm = CannedLlm::ok(CLEAN_RESPONSE);
    let out = analyze_chunks(Some(&llm), "mock", &hits, 30);

    assert_eq!(out.points.len(), 2);
    assert_eq!(out.confidence, 0.85);

    let first = &out.points[0];
    assert_eq!(first.summary, "The statute of limitations bars the claim");
    assert_eq!(first.importance.as_deref(), Some("Dispositive if accepted"));
    assert_eq!(first.importance_score, Some(0.9));
    assert_eq!(first.stance, Stance::Defendant);
    assert_eq!(
        first.supporting_quote.as_deref(),
        Some("the claim is time-barred")
    );
    assert_eq!(first.legal_concepts, vec!["statute of limitations".to_string()]);
    assert_eq!(first.page_start, Some(2));
    assert_eq!(first.category, Some(ArgumentCategory::Procedural));
    // Anchored on the first retrieved chunk's score.
    assert_eq!(first.retrieval_score, Some(0.8));

    let second = &out.points[1];
    assert_eq!(second.stance, Stance::Plaintiff);
    assert_eq!(second.category, Some(ArgumentCategory::CaseLaw));
    assert_eq!(second.retrieval_score, Some(0.6));
}

#[test]
fn recovers_json_from_fenced_block() {
    let response = format!("Here are the arguments:\n```json\n{CLEAN_RESPONSE}\n```\nDone.");
    let hits = vec![retrieved("chunk one", 2, 0.8)];
    let out = analyze_chunks(Some(&CannedLlm::ok(&response)), "mock", &hits, 30);
    assert_eq!(out.points.len(), 2);
}

#[test]
fn recovers_json_from_surrounding_prose() {
    let response = format!("Sure! I analyzed the brief. {CLEAN_RESPONSE} Hope that helps.");
    let hits = vec![retrieved("chunk one", 2, 0.8)];
    let out = analyze_chunks(Some(&CannedLlm::ok(&response)), "mock", &hits, 30);
    assert_eq!(out.points.len(), 2);
}

#[test]
fn recovers_json_after_known_prefix() {
    let response = format!("Here is the JSON: {CLEAN_RESPONSE}");
    let hits = vec![retrieved("chunk one", 2, 0.8)];
    let out = analyze_chunks(Some(&CannedLlm::ok(&response)), "mock", &hits, 30);
    assert_eq!(out.points.len(), 2);
}

#[test]
fn accepts_extracted_points_as_record_key() {
    let response = r#"{"extracted_points": [{"argument": "Venue is improper"}]}"#;
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 30);
    assert_eq!(out.points.len(), 1);
    assert_eq!(out.points[0].summary, "Venue is improper");
    // No confidence field: default applies.
    assert_eq!(out.confidence, 0.8);
}

#[test]
fn unparseable_output_degrades_to_empty() {
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(
        Some(&CannedLlm::ok("I could not find any arguments, sorry.")),
        "mock",
        &hits,
        30,
    );
    assert!(out.points.is_empty());
    assert_eq!(out.confidence, 0.0);
}

#[test]
fn generation_failure_degrades_to_empty() {
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::failing()), "mock", &hits, 30);
    assert!(out.points.is_empty());
    assert_eq!(out.confidence, 0.0);
}

#[test]
fn missing_backend_degrades_to_empty() {
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(None, "mock", &hits, 30);
    assert!(out.points.is_empty());
    assert_eq!(out.confidence, 0.0);
}

#[test]
fn records_without_a_summary_are_dropped_individually() {
    let response = r#"{
      "arguments": [
        {"summary": "Keep me"},
        {"importance_score": 0.9},
        {"summary": "   "},
        {"summary": "Keep me too"}
      ]
    }"#;
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 30);
    assert_eq!(out.points.len(), 2);
    assert_eq!(out.points[0].summary, "Keep me");
    assert_eq!(out.points[1].summary, "Keep me too");
}

#[test]
fn unknown_enums_and_bad_fields_degrade_per_field() {
    let response = r#"{
      "arguments": [
        {
          "summary": "Standing is contested",
          "importance_score": 7.5,
          "stance": "appellant-intervenor",
          "category": "made-up",
          "page_start": 0,
          "supporting_quote": ""
        }
      ],
      "confidence": 3.0
    }"#;
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 30);

    assert_eq!(out.points.len(), 1);
    let point = &out.points[0];
    assert_eq!(point.importance_score, Some(1.0)); // clamped
    assert_eq!(point.stance, Stance::Unknown);
    assert_eq!(point.category, Some(ArgumentCategory::Other));
    assert_eq!(point.page_start, None); // pages are 1-based
    assert_eq!(point.supporting_quote, None);
    assert_eq!(out.confidence, 1.0); // clamped
}

#[test]
fn records_past_the_bundle_get_a_neutral_retrieval_anchor() {
    let response = r#"{
      "arguments": [
        {"summary": "First"},
        {"summary": "Second"},
        {"summary": "Third"}
      ]
    }"#;
    // Only one retrieved chunk: records 2 and 3 have no originating chunk.
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 30);
    assert_eq!(out.points[0].retrieval_score, Some(0.9));
    assert_eq!(out.points[1].retrieval_score, Some(0.5));
    assert_eq!(out.points[2].retrieval_score, Some(0.5));
}

#[test]
fn record_supplied_retrieval_score_wins_over_the_anchor() {
    let response = r#"{"arguments": [{"summary": "Scored", "retrieval_score": 0.25}]}"#;
    let hits = vec![retrieved("chunk one", 1, 0.9)];
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 30);
    assert_eq!(out.points[0].retrieval_score, Some(0.25));
}

#[test]
fn max_chunks_caps_the_context_bundle() {
    let hits: Vec<RetrievedChunk> = (0..5)
        .map(|i| retrieved(&format!("chunk {i}"), 1, 1.0 - i as f32 * 0.25))
        .collect();
    let response = r#"{"arguments": [{"summary": "One"}, {"summary": "Two"}, {"summary": "Three"}]}"#;
    let out = analyze_chunks(Some(&CannedLlm::ok(response)), "mock", &hits, 2);
    // Bundle is the first two hits; the third record falls back to 0.5.
    assert_eq!(out.points[0].retrieval_score, Some(1.0));
    assert_eq!(out.points[1].retrieval_score, Some(0.75));
    assert_eq!(out.points[2].retrieval_score, Some(0.5));
}
