use lba_core::chunking::split_page;
use pretty_assertions::assert_eq;

fn page_text(chars: usize) -> String {
    "abcdefghij".repeat(chars / 10 + 1)[..chars].to_string()
}

#[test]
fn windows_advance_by_chunk_size_minus_overlap() {
    let text = page_text(3000);
    let chunks = split_page(&text, 1, "doc", 2, 1500, 200).expect("split");

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text.len(), 1500);
    assert_eq!(chunks[1].text.len(), 1500);
    assert_eq!(chunks[2].text.len(), 400);

    // Window starts at 0, 1300, 2600.
    assert_eq!(chunks[0].text, text[0..1500]);
    assert_eq!(chunks[1].text, text[1300..2800]);
    assert_eq!(chunks[2].text, text[2600..3000]);
}

#[test]
fn overlap_region_is_shared_between_consecutive_chunks() {
    let text = page_text(3000);
    let chunks = split_page(&text, 1, "doc", 1, 1500, 200).expect("split");

    // The tail of each window reappears as the head of the next one.
    assert_eq!(&chunks[0].text[1300..], &chunks[1].text[..200]);
    assert_eq!(&chunks[1].text[1300..], &chunks[2].text[..200]);
}

#[test]
fn chunk_indices_are_contiguous_per_page() {
    let text = page_text(5000);
    let chunks = split_page(&text, 3, "doc", 5, 1500, 200).expect("split");
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_index, i as u32);
        assert_eq!(chunk.metadata.page_number, 3);
        assert_eq!(chunk.metadata.total_pages, 5);
        assert_eq!(
            chunk.metadata.chunk_id,
            format!("doc_page3_chunk{i}")
        );
    }
}

#[test]
fn short_page_yields_exactly_one_chunk() {
    let text = page_text(500);
    let chunks = split_page(&text, 2, "doc", 2, 1500, 200).expect("split");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
    assert_eq!(chunks[0].metadata.chunk_index, 0);
}

#[test]
fn whitespace_only_page_yields_no_chunks() {
    let chunks = split_page("  \n\n\t   ", 1, "doc", 1, 1500, 200).expect("split");
    assert!(chunks.is_empty());
}

#[test]
fn blank_windows_do_not_consume_an_index() {
    // 1200 chars of text, 2000 of whitespace, 600 of text: the middle window
    // (1300..2800) is entirely whitespace and must be dropped without leaving
    // a gap in the indices.
    let mut text = page_text(1200);
    text.push_str(&" ".repeat(2000));
    text.push_str(&page_text(600));
    let chunks = split_page(&text, 1, "doc", 1, 1500, 200).expect("split");

    assert_eq!(chunks.len(), 2);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.metadata.chunk_index, i as u32);
        assert!(!chunk.text.trim().is_empty());
    }
}

#[test]
fn multibyte_text_does_not_split_code_points() {
    let text = "§".repeat(2000);
    let chunks = split_page(&text, 1, "doc", 1, 1500, 200).expect("split");
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text.chars().count(), 1500);
    assert_eq!(chunks[1].text.chars().count(), 700);
}

#[test]
fn rejects_invalid_window_parameters() {
    assert!(split_page("text", 1, "doc", 1, 200, 200).is_err());
    assert!(split_page("text", 1, "doc", 1, 200, 300).is_err());
}
