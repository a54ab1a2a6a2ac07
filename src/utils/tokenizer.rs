use unicode_segmentation::{UWordBoundIndices, UnicodeSegmentation};

/// Maximum token length to store in the index.
/// Longer words are still segmented (they occupy a position) but never indexed.
pub const MAX_TOKEN_LENGTH: usize = 128;

/// A word segment of a document: the substring and its byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'t> {
    pub text: &'t str,
    pub offset: usize,
    pub len: usize,
}

/// Lazy, single-pass iterator over the word segments of a text.
///
/// Position `i` of a posting refers to the `i`-th segment yielded here, so
/// indexing and highlighting must both go through this iterator.
pub struct Segments<'t> {
    inner: UWordBoundIndices<'t>,
}

impl<'t> Iterator for Segments<'t> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        for (offset, word) in self.inner.by_ref() {
            if word.chars().any(char::is_alphanumeric) {
                return Some(Segment {
                    text: word,
                    offset,
                    len: word.len(),
                });
            }
        }
        None
    }
}

/// Split text into word segments on Unicode word boundaries
pub fn segments(text: &str) -> Segments<'_> {
    Segments {
        inner: text.split_word_bound_indices(),
    }
}

/// Normalize a word for dictionary lookup
pub fn normalize_term(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Tokenize a document into (normalized term, position) pairs.
/// Returns the pairs and the document length in positions.
pub fn tokenize_positions(text: &str) -> (Vec<(String, u32)>, u32) {
    let mut terms = Vec::new();
    let mut len = 0u32;

    for (pos, seg) in segments(text).enumerate() {
        len = pos as u32 + 1;
        if seg.len <= MAX_TOKEN_LENGTH {
            terms.push((normalize_term(seg.text), pos as u32));
        }
    }

    (terms, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_skip_punctuation() {
        let text = "Give up, dream!";
        let segs: Vec<_> = segments(text).collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].text, "Give");
        assert_eq!(segs[1], Segment { text: "up", offset: 5, len: 2 });
        assert_eq!(&text[segs[2].offset..segs[2].offset + segs[2].len], "dream");
    }

    #[test]
    fn test_segments_unicode() {
        let segs: Vec<_> = segments("naïve café 42").map(|s| s.text).collect();
        assert_eq!(segs, vec!["naïve", "café", "42"]);
    }

    #[test]
    fn test_tokenize_positions() {
        let (terms, len) = tokenize_positions("The cat saw the CAT");
        assert_eq!(len, 5);
        assert_eq!(terms[0], ("the".to_string(), 0));
        assert_eq!(terms[4], ("cat".to_string(), 4));
    }

    #[test]
    fn test_long_token_keeps_position() {
        let long = "x".repeat(MAX_TOKEN_LENGTH + 1);
        let (terms, len) = tokenize_positions(&format!("a {} b", long));
        assert_eq!(len, 3);
        assert_eq!(terms, vec![("a".to_string(), 0), ("b".to_string(), 2)]);
    }
}
