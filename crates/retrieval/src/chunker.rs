//! Corpus chunking — overlapping character windows.
//!
//! The knowledge base file is one or more paragraphs of plain text; the
//! indexing job splits it into fixed-size windows with an overlap so that
//! sentences straddling a boundary still appear whole in one chunk.

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 100;

/// Split `text` into overlapping chunks.
///
/// Each window is `chunk_size` characters; the next window starts
/// `chunk_size - overlap` characters after the previous one. Chunks are
/// whitespace-trimmed and empty chunks are dropped. `overlap` must be
/// smaller than `chunk_size` or the window would never advance.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    assert!(chunk_size > 0, "chunk_size must be positive");
    assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start += step;
    }
    chunks
}
