//! Text chunking with configurable size and overlap.

use vectorlink_core::{AppError, AppResult};

/// Characters per chunk used when the caller has no preference.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared by consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Split text into overlapping windows of `chunk_size` characters.
///
/// Windows start every `chunk_size - overlap` characters; the last window may
/// be shorter. Sizes count `char`s, so multi-byte text is never split inside
/// a code point. Empty text yields no chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> AppResult<Vec<String>> {
    if chunk_size == 0 {
        return Err(AppError::Other(
            "Chunk size must be greater than zero".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(AppError::Other(format!(
            "Chunk overlap ({}) must be smaller than chunk size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;

    let chunks: Vec<String> = (0..chars.len())
        .step_by(step)
        .map(|start| {
            let end = (start + chunk_size).min(chars.len());
            chars[start..end].iter().collect()
        })
        .collect();

    tracing::debug!(
        "Chunked {} chars into {} chunks (size: {}, overlap: {})",
        chars.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_windows() {
        let text = "a".repeat(1500);
        let chunks = chunk_text(&text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).unwrap();

        // Windows start at 0 and 800
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 700);
    }

    #[test]
    fn test_chunk_text_overlap_is_shared() {
        let chunks = chunk_text("abcdefghij", 4, 2).unwrap();
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij", "ij"]);
    }

    #[test]
    fn test_chunk_text_short_input() {
        let chunks = chunk_text("hello", 1000, 200).unwrap();
        assert_eq!(chunks, vec!["hello"]);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_chunk_text_utf8_safety() {
        let text = "ação 🎮 jogos";
        let chunks = chunk_text(text, 3, 1).unwrap();
        assert_eq!(chunks[0], "açã");
        assert_eq!(chunks[1], "ão ");
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }

    #[test]
    fn test_chunk_text_rejects_bad_overlap() {
        assert!(chunk_text("abc", 4, 4).is_err());
        assert!(chunk_text("abc", 0, 0).is_err());
    }
}
