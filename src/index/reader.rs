use crate::error::{Result as SearchResult, SearchError};
use crate::index::blob::BlobStore;
use crate::index::map_file;
use crate::index::posting::DiskPosting;
use crate::index::source::{PostingSource, TermDictionary};
use crate::index::types::*;
use crate::utils::{read_u16_le, read_u32_le, read_u64_le, u32_at};
use anyhow::{Context, Result};
use memmap2::Mmap;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Term dictionary: term ids are dense, starting at 1
struct TermDict {
    terms: Vec<String>,
    entries: Vec<DictEntry>,
    by_text: FxHashMap<String, TermId>,
}

impl TermDict {
    fn entry(&self, term_id: TermId) -> Option<&DictEntry> {
        (term_id as usize)
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
    }
}

/// Memory-mapped, read-only index
pub struct IndexReader {
    index_path: PathBuf,
    pub meta: IndexMeta,
    dict: TermDict,
    postings: Option<Mmap>,
    doc_lens: Option<Mmap>,
    urls: BlobStore,
    texts: BlobStore,
}

impl IndexReader {
    /// Open an existing index directory
    pub fn open(index_path: &Path) -> Result<Self> {
        let meta_path = index_path.join("meta.json");
        let meta_file = File::open(&meta_path)
            .with_context(|| format!("No index found at {}", index_path.display()))?;
        let meta: IndexMeta = serde_json::from_reader(meta_file).context("Failed to parse meta.json")?;

        if meta.version != INDEX_VERSION {
            anyhow::bail!(
                "Unsupported index version {} (expected {})",
                meta.version,
                INDEX_VERSION
            );
        }

        // The dictionary is the only eagerly decoded file; load it alongside the mmaps
        let (dict, maps) = rayon::join(
            || read_term_dict(index_path),
            || -> Result<_> {
                Ok((
                    map_file(&index_path.join("postings.bin"))?,
                    map_file(&index_path.join("doclens.bin"))?,
                    BlobStore::open(index_path, "url", BlobCodec::Raw)?,
                    BlobStore::open(index_path, "txt", meta.text_codec)?,
                ))
            },
        );
        let dict = dict?;
        let (postings, doc_lens, urls, texts) = maps?;

        tracing::debug!(
            path = %index_path.display(),
            docs = meta.doc_count,
            terms = dict.entries.len(),
            "index opened"
        );

        Ok(Self {
            index_path: index_path.to_path_buf(),
            meta,
            dict,
            postings,
            doc_lens,
            urls,
            texts,
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.dict.entries.len()
    }

    /// Document URL store
    pub fn urls(&self) -> &BlobStore {
        &self.urls
    }

    /// Document text store
    pub fn texts(&self) -> &BlobStore {
        &self.texts
    }
}

impl TermDictionary for IndexReader {
    fn lookup(&self, term: &str) -> Option<TermId> {
        self.dict.by_text.get(term).copied()
    }

    fn term_text(&self, term_id: TermId) -> Option<&str> {
        (term_id as usize)
            .checked_sub(1)
            .and_then(|idx| self.dict.terms.get(idx))
            .map(String::as_str)
    }

    fn document_frequency(&self, term_id: TermId) -> u32 {
        self.dict.entry(term_id).map(|e| e.doc_freq).unwrap_or(0)
    }

    fn corpus_document_count(&self) -> u32 {
        self.meta.doc_count
    }

    fn average_document_length(&self) -> f32 {
        self.meta.avg_doc_len()
    }

    fn document_length(&self, doc_id: DocId) -> u32 {
        let lens = self.doc_lens.as_deref().unwrap_or(&[]);
        (doc_id as usize)
            .checked_sub(1)
            .and_then(|idx| u32_at(lens, idx))
            .unwrap_or(0)
    }
}

impl PostingSource for IndexReader {
    fn open_disk_posting(&self, term_id: TermId) -> SearchResult<DiskPosting<'_>> {
        let entry = self
            .dict
            .entry(term_id)
            .ok_or(SearchError::UnknownTerm(term_id))?;

        // Offsets come from disk and may be garbage
        let range = usize::try_from(entry.offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(entry.length as usize)?))
            .ok_or(SearchError::CorruptPosting(term_id))?;
        let data = self
            .postings
            .as_deref()
            .unwrap_or(&[])
            .get(range)
            .ok_or(SearchError::CorruptPosting(term_id))?;

        Ok(DiskPosting::new(term_id, data, entry.doc_freq))
    }
}

/// Read terms.dict
///
/// Layout: `u32 count`, then per term in id order:
/// `u16 len, bytes, u64 offset, u32 length, u32 doc_freq`.
fn read_term_dict(index_path: &Path) -> Result<TermDict> {
    let dict_path = index_path.join("terms.dict");
    let mut file = BufReader::new(File::open(&dict_path).context("Failed to open terms.dict")?);

    let count = read_u32_le(&mut file)? as usize;

    let mut terms = Vec::with_capacity(count);
    let mut entries = Vec::with_capacity(count);
    let mut by_text = FxHashMap::default();
    by_text.reserve(count);

    for idx in 0..count {
        let term_len = read_u16_le(&mut file)? as usize;
        let mut term_bytes = vec![0u8; term_len];
        file.read_exact(&mut term_bytes)?;
        let term = String::from_utf8_lossy(&term_bytes).into_owned();

        let offset = read_u64_le(&mut file)?;
        let length = read_u32_le(&mut file)?;
        let doc_freq = read_u32_le(&mut file)?;

        by_text.insert(term.clone(), idx as TermId + 1);
        terms.push(term);
        entries.push(DictEntry {
            offset,
            length,
            doc_freq,
        });
    }

    Ok(TermDict {
        terms,
        entries,
        by_text,
    })
}
