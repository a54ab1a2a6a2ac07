pub mod blob;
pub mod build;
pub mod cache;
pub mod posting;
pub mod reader;
pub mod source;
pub mod stats;
pub mod types;
pub mod writer;

pub use blob::BlobStore;
pub use cache::PostingCache;
pub use posting::{CachedPosting, DiskPosting, PostingCursor, TermPosting};
pub use reader::IndexReader;
pub use source::{PostingSource, TermDictionary};
pub use types::*;
pub use writer::IndexWriter;

use anyhow::Result;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Memory-map a file. Missing and empty files map to `None`
/// (a zero-length mapping is rejected by the OS).
pub(crate) fn map_file(path: &Path) -> Result<Option<Mmap>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(None);
    }

    // SAFETY: index files are written once and never modified in place
    let map = unsafe { Mmap::map(&file)? };
    Ok(Some(map))
}
