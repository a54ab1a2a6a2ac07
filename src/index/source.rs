//! Interfaces the query core consumes from index storage.

use crate::error::Result;
use crate::index::posting::DiskPosting;
use crate::index::types::{DocId, TermId};

/// Term lookup and corpus statistics
pub trait TermDictionary {
    /// Resolve a normalized term to its id
    fn lookup(&self, term: &str) -> Option<TermId>;

    /// Reverse lookup, used for diagnostics
    fn term_text(&self, term_id: TermId) -> Option<&str>;

    /// Number of documents containing the term
    fn document_frequency(&self, term_id: TermId) -> u32;

    fn corpus_document_count(&self) -> u32;

    fn average_document_length(&self) -> f32;

    /// Document length in tokens (0 for unknown documents)
    fn document_length(&self, doc_id: DocId) -> u32;
}

/// Access to on-disk posting lists
pub trait PostingSource {
    /// Open an unstarted cursor over a term's posting list
    fn open_disk_posting(&self, term_id: TermId) -> Result<DiskPosting<'_>>;
}
