use lba_core::domain::{Chunk, ExtractedPoint, FinalKeyPoint};
use tracing::{debug, info};

pub mod similarity;

/// Score-fusion weights. Importance dominates (judged with full context by the
/// extractor), retrieval corroborates topical relevance, and match confidence
/// is a lower-weighted signal that suppresses points whose quoted text cannot
/// be found in the source without zeroing legitimate paraphrases.
const WEIGHT_IMPORTANCE: f32 = 0.5;
const WEIGHT_RETRIEVAL: f32 = 0.3;
const WEIGHT_MATCH: f32 = 0.2;

/// Default for importance/retrieval when the extractor omitted them.
const MISSING_SCORE_DEFAULT: f32 = 0.5;

/// Reconciles extracted points against the source chunks and produces the
/// final ranked list.
///
/// Per point: the supporting quote (or summary) is fuzzy-matched back to its
/// best source chunk, the reported page is overwritten with that chunk's true
/// page, and the three signals are fused into one combined score. The sort is
/// stable, so equal scores keep their input order and repeated runs over
/// identical inputs produce identical rankings.
pub fn process_and_rank(
    points: Vec<ExtractedPoint>,
    chunks: &[Chunk],
    top_k: usize,
) -> Vec<FinalKeyPoint> {
    let mut final_points: Vec<FinalKeyPoint> = Vec::with_capacity(points.len());

    for point in points {
        let importance_score = point.importance_score.unwrap_or(MISSING_SCORE_DEFAULT);
        let retrieval_score = point.retrieval_score.unwrap_or(MISSING_SCORE_DEFAULT);

        let quote = point
            .supporting_quote
            .clone()
            .unwrap_or_else(|| point.summary.clone());
        let (best_chunk, match_confidence) =
            find_best_matching_chunk(&quote, chunks, point.page_start);

        // The matched chunk's recorded page corrects hallucinated locations.
        let page_start = best_chunk
            .map(|c| c.metadata.page_number)
            .or(point.page_start);

        let combined_score = WEIGHT_IMPORTANCE * importance_score
            + WEIGHT_RETRIEVAL * retrieval_score
            + WEIGHT_MATCH * match_confidence;

        final_points.push(FinalKeyPoint {
            summary: point.summary,
            importance: point.importance,
            importance_score,
            stance: point.stance,
            supporting_quote: Some(quote),
            legal_concepts: point.legal_concepts,
            page_start,
            page_end: point.page_end,
            category: point.category,
            retrieval_score,
            combined_score,
            final_rank: 1,
        });
    }

    // sort_by is stable: ties keep their input order.
    final_points.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    final_points.truncate(top_k);

    for (i, point) in final_points.iter_mut().enumerate() {
        point.final_rank = (i + 1) as u32;
    }

    info!(ranked = final_points.len(), "processed and ranked key points");
    final_points
}

/// Finds the chunk whose text best matches the quote.
///
/// Candidates are restricted to the reported page when any chunks live there,
/// falling back to the whole document otherwise. Ties keep the earliest chunk.
fn find_best_matching_chunk<'a>(
    quote: &str,
    chunks: &'a [Chunk],
    expected_page: Option<u32>,
) -> (Option<&'a Chunk>, f32) {
    if quote.trim().is_empty() || chunks.is_empty() {
        return (None, 0.0);
    }

    let on_page: Vec<&Chunk> = match expected_page {
        Some(page) => chunks
            .iter()
            .filter(|c| c.metadata.page_number == page)
            .collect(),
        None => Vec::new(),
    };
    let candidates: Vec<&Chunk> = if on_page.is_empty() {
        chunks.iter().collect()
    } else {
        on_page
    };

    let mut best_match = None;
    let mut best_score = 0.0f32;
    for chunk in candidates {
        let score = similarity::token_set_ratio(quote, &chunk.text);
        if score > best_score {
            best_score = score;
            best_match = Some(chunk);
        }
    }

    debug!(confidence = best_score, "quote match confidence");
    (best_match, best_score)
}
