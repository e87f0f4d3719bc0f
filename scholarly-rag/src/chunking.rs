//! Text chunking for ingestion
//!
//! Splits a document into overlapping character windows, preferring to cut
//! at whitespace so words are not split across chunks.

use crate::types::TextChunk;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Split `text` into windows of at most `chunk_size` characters.
///
/// A window that does not reach the end of the text is shortened to its last
/// space or newline, provided that break lies past the window's midpoint.
/// Consecutive windows overlap by `overlap` characters. Windows that are
/// empty after trimming are dropped; offsets count characters, not bytes.
/// Chunking ends with the first window that reaches the end of the text, so
/// no trailing fragment already contained in the last chunk is emitted.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();

    if chunk_size == 0 {
        return chunks;
    }

    let mut start = 0;
    while start < len {
        let mut end = (start + chunk_size).min(len);

        if end < len {
            let window = &chars[start..end];
            if let Some(cut) = window.iter().rposition(|c| *c == ' ' || *c == '\n') {
                if cut * 2 > chunk_size {
                    end = start + cut;
                }
            }
        }

        let segment: String = chars[start..end].iter().collect();
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                chunk_index: chunks.len(),
                start,
                end,
            });
        }

        if end >= len {
            break;
        }

        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("  A short abstract.  ", 1000, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "A short abstract.");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, 21);
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(chunk_text("", 1000, 200).is_empty());
        assert!(chunk_text("   \n\n  ", 1000, 200).is_empty());
    }

    #[test]
    fn test_windows_cut_at_whitespace_and_overlap() {
        let text = "word ".repeat(500);
        let chunks = chunk_text(&text, 1000, 200);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(b.start, a.end - 200);
            assert!(a.end - a.start <= 1000);
        }
        for chunk in &chunks {
            assert!(!chunk.text.starts_with(' '));
            assert!(chunk.text.split(' ').all(|w| w == "word"));
        }
        assert_eq!(chunks.last().map(|c| c.end), Some(text.chars().count()));
    }

    #[test]
    fn test_no_whitespace_uses_full_window() {
        let text = "x".repeat(2500);
        let chunks = chunk_text(&text, 1000, 200);

        let bounds: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(bounds, vec![(0, 1000), (800, 1800), (1600, 2500)]);
        let indexes: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_final_window_is_last_chunk() {
        let chunks = chunk_text(&"x".repeat(2500), 1000, 200);
        let last = chunks.last().map(|c| (c.start, c.end));
        assert_eq!(last, Some((1600, 2500)));
        assert_eq!(chunks.len(), 3);

        // A window ending exactly at the end of the text has no tail chunk
        let chunks = chunk_text(&"x".repeat(1000), 1000, 200);
        let bounds: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(bounds, vec![(0, 1000)]);

        let chunks = chunk_text(&"x".repeat(25), 10, 2);
        let bounds: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(bounds, vec![(0, 10), (8, 18), (16, 25)]);
    }

    #[test]
    fn test_break_before_midpoint_is_ignored() {
        let mut text = String::from("ab ");
        text.push_str(&"y".repeat(20));
        let chunks = chunk_text(&text, 10, 2);

        assert_eq!(chunks[0].end, 10);
    }

    #[test]
    fn test_offsets_count_characters() {
        let text = "é".repeat(15);
        let chunks = chunk_text(&text, 10, 2);
        assert_eq!(chunks[0].text.chars().count(), 10);
        assert_eq!(chunks[1].start, 8);
    }

    #[test]
    fn test_overlap_larger_than_window_still_advances() {
        let chunks = chunk_text(&"z".repeat(30), 5, 10);
        assert!(chunks.windows(2).all(|p| p[1].start > p[0].start));
        assert_eq!(chunks.last().map(|c| c.end), Some(30));
    }
}
