use crate::index::types::DocId;
use thiserror::Error;

/// Main error type for query execution
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("posting merge operation undefined")]
    UndefinedMergeOp,

    #[error("query has no terms")]
    EmptyQuery,

    #[error("too many query terms: {got} (max {max})")]
    TooManyTerms { max: usize, got: usize },

    #[error("query term too long: {len} bytes (max {max})")]
    TermTooLong { max: usize, len: usize },

    #[error("unknown term id #{0}")]
    UnknownTerm(u32),

    #[error("corrupt posting list for term #{0}")]
    CorruptPosting(u32),

    #[error("blob not found for doc#{0}")]
    BlobNotFound(DocId),

    #[error("failed to decompress blob of doc#{doc_id}: {source}")]
    Decompress {
        doc_id: DocId,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for query execution
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Errors that only affect a single document's displayed content
    pub fn is_per_document(&self) -> bool {
        matches!(
            self,
            SearchError::BlobNotFound(_) | SearchError::Decompress { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::TooManyTerms { max: 16, got: 20 };
        assert_eq!(err.to_string(), "too many query terms: 20 (max 16)");

        let err = SearchError::BlobNotFound(7);
        assert_eq!(err.to_string(), "blob not found for doc#7");
        assert!(err.is_per_document());
        assert!(!SearchError::UndefinedMergeOp.is_per_document());
    }
}
