use serde::{Deserialize, Serialize};

/// Unique identifier for a document in the index
pub type DocId = u32;

/// Unique identifier for a term in the dictionary
pub type TermId = u32;

/// Index of a token within a document's segment sequence
pub type Position = u32;

/// Largest valid document id. `u32::MAX` is reserved and never assigned.
pub const MAX_DOC_ID: DocId = u32::MAX - 1;

/// Current on-disk layout version
pub const INDEX_VERSION: u32 = 1;

/// One term's occurrence record for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingItem {
    pub doc_id: DocId,
    /// Term frequency within the document
    pub tf: u32,
    /// Ascending token positions
    pub positions: Vec<Position>,
}

impl PostingItem {
    pub fn new(doc_id: DocId, positions: Vec<Position>) -> Self {
        Self {
            doc_id,
            tf: positions.len() as u32,
            positions,
        }
    }
}

/// Codec applied to a blob store's payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlobCodec {
    #[default]
    Raw,
    Zstd,
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub doc_count: u32,
    pub term_count: u32,
    /// Sum of all document lengths in tokens
    pub total_tokens: u64,
    pub text_codec: BlobCodec,
    pub created_at: u64,
}

impl IndexMeta {
    /// Average document length in tokens (0 for an empty corpus)
    pub fn avg_doc_len(&self) -> f32 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_tokens as f32 / self.doc_count as f32
        }
    }
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            doc_count: 0,
            term_count: 0,
            total_tokens: 0,
            text_codec: BlobCodec::Zstd,
            created_at: 0,
        }
    }
}

/// Dictionary entry mapping a term to its postings
#[derive(Debug, Clone, Copy)]
pub struct DictEntry {
    pub offset: u64,
    pub length: u32,
    pub doc_freq: u32,
}
