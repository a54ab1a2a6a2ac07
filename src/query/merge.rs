//! N-way posting merge.
//!
//! Drives any number of [`PostingCursor`]s in lock-step and yields each
//! candidate document once, in strictly increasing id order, together with
//! the cursors positioned on it.
//!
//! - **OR** emits every id present in at least one posting, reporting the
//!   subset of cursors sitting on it.
//! - **AND** emits only ids present in every posting and stops for good as
//!   soon as one cursor runs dry.
//!
//! AND can either step the cursors at the minimum one id at a time, or
//! leapfrog every lagging cursor straight to the current maximum with
//! [`PostingCursor::jump`]. Both strategies produce identical output.

use crate::error::{Result, SearchError};
use crate::index::posting::PostingCursor;
use crate::index::types::{DocId, PostingItem};
use std::fmt;

/// Boolean combination of query terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOp {
    And,
    Or,
    /// Unrecognized operator; merging with it is a configuration error
    Undefined,
}

impl MergeOp {
    /// Parse "AND" / "OR" (case-insensitive); anything else is `Undefined`
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("and") {
            MergeOp::And
        } else if s.eq_ignore_ascii_case("or") {
            MergeOp::Or
        } else {
            MergeOp::Undefined
        }
    }
}

impl fmt::Display for MergeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOp::And => write!(f, "AND"),
            MergeOp::Or => write!(f, "OR"),
            MergeOp::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

/// How AND advances cursors that lag behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Advance the cursors at the minimum one document at a time
    Step,
    /// Jump lagging cursors to the current maximum
    #[default]
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeState {
    Unstarted,
    Running,
    Done,
}

/// Merge state over the postings of one query
pub struct PostingMerger<C: PostingCursor> {
    cursors: Vec<C>,
    op: MergeOp,
    strategy: MergeStrategy,
    /// Indices of the cursors positioned on the last emitted id
    matched: Vec<usize>,
    state: MergeState,
}

/// One merge event: a candidate document and the postings that contain it
pub struct MergeMatch<'m, C> {
    pub doc_id: DocId,
    cursors: &'m [C],
    matched: &'m [usize],
}

impl<'m, C: PostingCursor> MergeMatch<'m, C> {
    /// Indices (in term order) of the cursors matching this document
    pub fn matching(&self) -> &'m [usize] {
        self.matched
    }

    /// Matching posting items, in term order
    pub fn items(&self) -> impl Iterator<Item = (usize, &'m PostingItem)> + use<'m, C> {
        let cursors = self.cursors;
        self.matched
            .iter()
            .filter_map(move |&i| cursors[i].current_item().map(|item| (i, item)))
    }
}

impl<C: PostingCursor> PostingMerger<C> {
    /// Prepare a merge. Cursors are started lazily on the first `next_match`.
    pub fn new(cursors: Vec<C>, op: MergeOp) -> Result<Self> {
        if op == MergeOp::Undefined {
            return Err(SearchError::UndefinedMergeOp);
        }

        Ok(Self {
            matched: Vec::with_capacity(cursors.len()),
            cursors,
            op,
            strategy: MergeStrategy::default(),
            state: MergeState::Unstarted,
        })
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn op(&self) -> MergeOp {
        self.op
    }

    pub fn cursors(&self) -> &[C] {
        &self.cursors
    }

    /// Produce the next candidate, or `None` once the merge is complete
    pub fn next_match(&mut self) -> Option<MergeMatch<'_, C>> {
        match self.state {
            MergeState::Done => return None,
            MergeState::Unstarted => {
                for cursor in &mut self.cursors {
                    cursor.start();
                }
                self.state = MergeState::Running;
            }
            MergeState::Running => {
                // Only the cursors consumed by the previous event move
                for &i in &self.matched {
                    self.cursors[i].next();
                }
            }
        }

        self.matched.clear();
        let found = match self.op {
            MergeOp::And => self.seek_and(),
            MergeOp::Or => self.seek_or(),
            MergeOp::Undefined => None,
        };

        match found {
            Some(doc_id) => Some(MergeMatch {
                doc_id,
                cursors: &self.cursors,
                matched: &self.matched,
            }),
            None => {
                self.state = MergeState::Done;
                None
            }
        }
    }

    /// Release all cursors. Further calls to `next_match` return `None`.
    pub fn finish(&mut self) {
        for cursor in &mut self.cursors {
            cursor.finish();
        }
        self.matched.clear();
        self.state = MergeState::Done;
    }

    fn min_id(&self) -> Option<DocId> {
        self.cursors.iter().filter_map(|c| c.current_id()).min()
    }

    fn seek_or(&mut self) -> Option<DocId> {
        let min = self.min_id()?;
        for (i, cursor) in self.cursors.iter().enumerate() {
            if cursor.current_id() == Some(min) {
                self.matched.push(i);
            }
        }
        Some(min)
    }

    fn seek_and(&mut self) -> Option<DocId> {
        if self.cursors.is_empty() {
            return None;
        }

        loop {
            // A single exhausted posting empties the intersection for good
            let mut min = DocId::MAX;
            let mut max = 0;
            for cursor in &self.cursors {
                let id = cursor.current_id()?;
                min = min.min(id);
                max = max.max(id);
            }

            if min == max {
                self.matched.extend(0..self.cursors.len());
                return Some(min);
            }

            match self.strategy {
                MergeStrategy::Step => {
                    for cursor in &mut self.cursors {
                        if cursor.current_id() == Some(min) {
                            cursor.next();
                        }
                    }
                }
                MergeStrategy::Jump => {
                    for cursor in &mut self.cursors {
                        if cursor.current_id().is_some_and(|id| id < max) {
                            leap(cursor, max);
                        }
                    }
                }
            }
        }
    }
}

/// Move a cursor to the first id >= `target`, walking if `jump` refuses
fn leap<C: PostingCursor>(cursor: &mut C, target: DocId) {
    if cursor.jump(target as u64) {
        return;
    }
    while cursor.current_id().is_some_and(|id| id < target) {
        cursor.next();
    }
}
