use std::path::Path;

use lopdf::Document;
use tracing::{debug, info};

use crate::error::AppError;

/// Extracts per-page text from a PDF on disk.
///
/// Returns one string per page in ascending page order plus the total page
/// count. Pages without a text layer come back empty; the caller decides
/// whether an all-empty document is an error.
pub fn extract_pages(path: &Path) -> Result<(Vec<String>, u32), AppError> {
    if !path.is_file() {
        return Err(AppError::new("PDF_NOT_FOUND", "PDF file not found")
            .with_details(format!("path={}", path.display())));
    }

    let doc = Document::load(path).map_err(|e| {
        AppError::new("PDF_PARSE_FAILED", "Failed to parse PDF")
            .with_details(format!("path={}; err={e}", path.display()))
    })?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();
    if page_numbers.is_empty() {
        return Err(AppError::new("PDF_EMPTY", "PDF has no pages")
            .with_details(format!("path={}", path.display())));
    }

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in page_numbers.iter() {
        // A page with no text layer is not fatal; it simply yields no chunks.
        let text = doc.extract_text(&[*page]).unwrap_or_default();
        debug!(page, chars = text.len(), "extracted page text");
        pages.push(text);
    }

    let total_pages = pages.len() as u32;
    info!(total_pages, "extracted PDF pages");
    Ok((pages, total_pages))
}

/// Magic-byte check: `%PDF` must appear within the first 1024 bytes (some
/// producers emit a BOM or junk before the header).
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(4).any(|w| w == b"%PDF")
}
