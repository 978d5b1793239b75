use tracing::debug;

use crate::domain::{Chunk, ChunkMetadata};
use crate::error::AppError;

/// Splits one page of extracted text into overlapping fixed-length windows.
///
/// Windows are `chunk_size` characters wide and each subsequent window starts
/// `chunk_size - overlap` characters after the previous one; the final window
/// takes the remainder with no look-ahead overlap. Windows that are blank
/// after trimming are dropped without consuming a `chunk_index`, so indices
/// stay contiguous per page.
pub fn split_page(
    text: &str,
    page_number: u32,
    document_id: &str,
    total_pages: u32,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, AppError> {
    if chunk_size == 0 || overlap >= chunk_size {
        return Err(
            AppError::new("CONFIG_INVALID", "overlap must be smaller than chunk_size")
                .with_details(format!("chunk_size={chunk_size}; overlap={overlap}")),
        );
    }

    // Windows are measured in chars, not bytes, so multi-byte text cannot be
    // split mid code point.
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut chunk_index = 0u32;

    while start < chars.len() {
        let end = usize::min(start + chunk_size, chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();

        if !trimmed.is_empty() {
            chunks.push(Chunk {
                text: trimmed.to_string(),
                metadata: ChunkMetadata {
                    chunk_id: format!("{document_id}_page{page_number}_chunk{chunk_index}"),
                    page_number,
                    document_id: document_id.to_string(),
                    total_pages,
                    chunk_index,
                },
            });
            chunk_index += 1;
        }

        start = if end < chars.len() { end - overlap } else { end };
    }

    debug!(
        page = page_number,
        chunks = chunks.len(),
        "split page into chunks"
    );
    Ok(chunks)
}
