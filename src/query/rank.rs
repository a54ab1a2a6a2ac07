//! Bounded top-K selection and pagination.
//!
//! Candidates are offered to a [`TopKHeap`] in merge order. The heap keeps
//! the K best hits seen so far with the worst one on top, so admission is a
//! single comparison against that threshold. Finalizing consumes the heap
//! and yields [`RankedResults`] in descending score order.
//!
//! Ties are broken by ascending document id. Merges emit documents in
//! ascending id order, so a later candidate with the same score as the
//! current worst hit always ranks below it and is rejected.

use crate::index::types::{DocId, Position};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored document and the occurrence positions captured for it
#[derive(Debug, Clone)]
pub struct RankHit {
    pub doc_id: DocId,
    pub score: f32,
    /// Capped occurrence positions, in term order
    pub occurs: Vec<Position>,
}

impl RankHit {
    pub fn new(doc_id: DocId, score: f32, occurs: Vec<Position>) -> Self {
        Self {
            doc_id,
            score,
            occurs,
        }
    }
}

impl PartialEq for RankHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankHit {}

impl PartialOrd for RankHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankHit {
    /// Rank order: `Less` means ranked higher. Higher scores come first,
    /// then lower document ids.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Top-K heap tracking the best hits during a merge.
/// The heap's maximum in rank order is the worst held hit.
pub struct TopKHeap {
    heap: BinaryHeap<RankHit>,
    /// Maximum capacity (k)
    capacity: usize,
}

impl TopKHeap {
    /// Create a new top-k heap with the given capacity
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(4096)),
            capacity: k,
        }
    }

    /// Score of the worst held hit once full; 0.0 before that
    #[inline]
    pub fn threshold(&self) -> f32 {
        if self.is_full() {
            self.heap.peek().map(|hit| hit.score).unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Check if a score could enter the top-k
    #[inline]
    pub fn would_enter(&self, score: f32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        !self.is_full() || score > self.threshold()
    }

    /// Try to insert a hit. Returns true if it was admitted.
    pub fn try_insert(&mut self, hit: RankHit) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if !self.is_full() {
            self.heap.push(hit);
            return true;
        }

        match self.heap.peek() {
            Some(worst) if hit.score > worst.score => {
                self.heap.pop();
                self.heap.push(hit);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consume the heap and return hits in rank order
    pub fn into_ranked(self) -> RankedResults {
        RankedResults {
            hits: self.heap.into_sorted_vec(),
        }
    }
}

/// Bounds of one result page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankWindow {
    /// First index (inclusive)
    pub from: usize,
    /// Last index (exclusive)
    pub to: usize,
    pub total_pages: usize,
}

impl RankWindow {
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Finalized results, ordered by descending score then ascending doc id
#[derive(Debug, Clone, Default)]
pub struct RankedResults {
    hits: Vec<RankHit>,
}

impl RankedResults {
    pub fn hits(&self) -> &[RankHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Index range of page `page` (0-based) with `page_size` hits per page
    pub fn window(&self, page: usize, page_size: usize) -> RankWindow {
        let len = self.hits.len();
        if page_size == 0 {
            return RankWindow {
                from: 0,
                to: 0,
                total_pages: 0,
            };
        }

        let from = page.saturating_mul(page_size).min(len);
        RankWindow {
            from,
            to: from.saturating_add(page_size).min(len),
            total_pages: len.div_ceil(page_size),
        }
    }

    /// Hits on page `page` and the total page count
    pub fn page(&self, page: usize, page_size: usize) -> (&[RankHit], usize) {
        let window = self.window(page, page_size);
        (&self.hits[window.from..window.to], window.total_pages)
    }
}
