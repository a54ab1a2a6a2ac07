use crate::index::types::Position;
use crate::utils::tokenizer::{Segment, segments};

/// Per-result highlight state: the occurrence positions to mark
#[derive(Debug, Clone, Default)]
pub struct HighlightContext {
    /// Sorted, deduplicated positions
    occurs: Vec<Position>,
}

impl HighlightContext {
    /// Repeated positions (a term queried twice) collapse to one, so each
    /// segment is marked and printed once.
    pub fn new(occurs: &[Position]) -> Self {
        let mut occurs = occurs.to_vec();
        occurs.sort_unstable();
        occurs.dedup();
        Self { occurs }
    }

    /// Occurrence positions in ascending order
    pub fn occurs(&self) -> &[Position] {
        &self.occurs
    }

    /// Re-segment `text` and return the segments at the occurrence
    /// positions, in text order
    pub fn select<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut selected = Vec::with_capacity(self.occurs.len());
        let mut wanted = self.occurs.iter().peekable();

        for (pos, segment) in segments(text).enumerate() {
            let Some(&&next) = wanted.peek() else {
                break;
            };
            if pos as Position == next {
                selected.push(segment);
                wanted.next();
            }
        }

        selected
    }
}
