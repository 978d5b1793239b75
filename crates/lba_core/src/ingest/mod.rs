pub mod pdf;

pub use pdf::{extract_pages, looks_like_pdf};
