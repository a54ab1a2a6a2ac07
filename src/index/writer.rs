use crate::index::blob::BlobWriter;
use crate::index::types::*;
use crate::utils::{encode_posting, tokenize_positions, write_u16_le, write_u32_le, write_u64_le};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A document split into per-term position lists (computed in parallel)
#[derive(Debug, Default)]
pub struct TokenizedDoc {
    pub terms: FxHashMap<String, Vec<Position>>,
    /// Document length in positions
    pub len: u32,
}

impl TokenizedDoc {
    pub fn from_text(text: &str) -> Self {
        let (pairs, len) = tokenize_positions(text);
        let mut terms: FxHashMap<String, Vec<Position>> = FxHashMap::default();
        for (term, pos) in pairs {
            terms.entry(term).or_default().push(pos);
        }
        Self { terms, len }
    }
}

/// Index writer producing the layout read by [`IndexReader`](super::IndexReader)
pub struct IndexWriter {
    index_path: PathBuf,
    /// Term -> postings in ascending doc order
    postings: BTreeMap<String, Vec<PostingItem>>,
    doc_lens: Vec<u32>,
    total_tokens: u64,
    text_codec: BlobCodec,
    urls: BlobWriter,
    texts: BlobWriter,
}

impl IndexWriter {
    /// Create a new index writer, creating the directory if needed
    pub fn new(index_path: &Path) -> Result<Self> {
        Self::with_codec(index_path, BlobCodec::Zstd)
    }

    pub fn with_codec(index_path: &Path, text_codec: BlobCodec) -> Result<Self> {
        fs::create_dir_all(index_path)
            .with_context(|| format!("Failed to create {}", index_path.display()))?;

        Ok(Self {
            index_path: index_path.to_path_buf(),
            postings: BTreeMap::new(),
            doc_lens: Vec::new(),
            total_tokens: 0,
            text_codec,
            urls: BlobWriter::create(index_path, "url", BlobCodec::Raw)?,
            texts: BlobWriter::create(index_path, "txt", text_codec)?,
        })
    }

    /// Add a document, tokenizing it on the calling thread
    pub fn add_document(&mut self, url: &str, text: &str) -> Result<DocId> {
        let doc = TokenizedDoc::from_text(text);
        self.add_tokenized(url, text, doc)
    }

    /// Add a document that was tokenized ahead of time
    pub fn add_tokenized(&mut self, url: &str, text: &str, doc: TokenizedDoc) -> Result<DocId> {
        if self.doc_lens.len() as u64 >= MAX_DOC_ID as u64 {
            anyhow::bail!("Document id space exhausted");
        }
        let doc_id = self.doc_lens.len() as DocId + 1;

        for (term, positions) in doc.terms {
            self.postings
                .entry(term)
                .or_default()
                .push(PostingItem::new(doc_id, positions));
        }

        self.doc_lens.push(doc.len);
        self.total_tokens += doc.len as u64;
        self.urls.append(url.as_bytes())?;
        self.texts.append(text.as_bytes())?;

        Ok(doc_id)
    }

    /// Number of documents added so far
    pub fn doc_count(&self) -> usize {
        self.doc_lens.len()
    }

    /// Write all index files and return the metadata
    pub fn commit(self) -> Result<IndexMeta> {
        let index_path = self.index_path;

        // postings.bin + terms.dict; term ids follow BTreeMap order
        let mut postings_out = BufWriter::new(File::create(index_path.join("postings.bin"))?);
        let mut dict_out = BufWriter::new(File::create(index_path.join("terms.dict"))?);
        write_u32_le(&mut dict_out, self.postings.len() as u32)?;

        let mut offset = 0u64;
        let mut buf = Vec::new();
        for (term, items) in &self.postings {
            buf.clear();
            let mut prev = 0;
            for item in items {
                encode_posting(item, prev, &mut buf);
                prev = item.doc_id;
            }
            postings_out.write_all(&buf)?;

            let term_bytes = term.as_bytes();
            write_u16_le(&mut dict_out, term_bytes.len() as u16)?;
            dict_out.write_all(term_bytes)?;
            write_u64_le(&mut dict_out, offset)?;
            write_u32_le(&mut dict_out, buf.len() as u32)?;
            write_u32_le(&mut dict_out, items.len() as u32)?;

            offset += buf.len() as u64;
        }
        postings_out.flush()?;
        dict_out.flush()?;

        // doclens.bin
        let mut lens_out = BufWriter::new(File::create(index_path.join("doclens.bin"))?);
        for len in &self.doc_lens {
            write_u32_le(&mut lens_out, *len)?;
        }
        lens_out.flush()?;

        self.urls.finish(&index_path, "url")?;
        self.texts.finish(&index_path, "txt")?;

        let meta = IndexMeta {
            version: INDEX_VERSION,
            doc_count: self.doc_lens.len() as u32,
            term_count: self.postings.len() as u32,
            total_tokens: self.total_tokens,
            text_codec: self.text_codec,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let meta_file = File::create(index_path.join("meta.json"))?;
        serde_json::to_writer_pretty(meta_file, &meta)?;

        tracing::info!(
            docs = meta.doc_count,
            terms = meta.term_count,
            path = %index_path.display(),
            "index written"
        );

        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::PostingCursor;
    use crate::index::reader::IndexReader;
    use crate::index::source::{PostingSource, TermDictionary};
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let mut writer = IndexWriter::new(dir.path()).unwrap();
        assert_eq!(writer.add_document("u1", "apple banana apple").unwrap(), 1);
        assert_eq!(writer.add_document("u2", "banana cherry").unwrap(), 2);
        assert_eq!(writer.doc_count(), 2);
        let meta = writer.commit().unwrap();
        assert_eq!(meta.doc_count, 2);
        assert_eq!(meta.term_count, 3);
        assert_eq!(meta.total_tokens, 5);

        let reader = IndexReader::open(dir.path()).unwrap();
        assert_eq!(reader.corpus_document_count(), 2);
        assert_eq!(reader.average_document_length(), 2.5);
        assert_eq!(reader.document_length(1), 3);
        assert_eq!(reader.document_length(2), 2);
        assert_eq!(reader.document_length(3), 0);

        let apple = reader.lookup("apple").unwrap();
        let banana = reader.lookup("banana").unwrap();
        assert_eq!(reader.term_text(apple), Some("apple"));
        assert_eq!(reader.document_frequency(apple), 1);
        assert_eq!(reader.document_frequency(banana), 2);
        assert!(reader.lookup("durian").is_none());

        let mut posting = reader.open_disk_posting(apple).unwrap();
        assert!(posting.start());
        assert_eq!(posting.current_item().unwrap().positions, vec![0, 2]);
        assert!(!posting.next());

        let mut posting = reader.open_disk_posting(banana).unwrap();
        assert!(posting.start());
        assert_eq!(posting.current_item().unwrap().positions, vec![1]);
        assert!(posting.next());
        assert_eq!(posting.current_item().unwrap().doc_id, 2);
        assert_eq!(posting.current_item().unwrap().positions, vec![0]);

        assert_eq!(reader.urls().read_text(2, 64).unwrap(), "u2");
        assert_eq!(reader.texts().read_text(1, 64).unwrap(), "apple banana apple");
    }

    #[test]
    fn test_tokenized_doc() {
        let doc = TokenizedDoc::from_text("To be, or not to be");
        assert_eq!(doc.len, 6);
        assert_eq!(doc.terms["to"], vec![0, 4]);
        assert_eq!(doc.terms["be"], vec![1, 5]);
    }

    #[test]
    fn test_empty_index() {
        let dir = TempDir::new().unwrap();
        IndexWriter::new(dir.path()).unwrap().commit().unwrap();

        let reader = IndexReader::open(dir.path()).unwrap();
        assert_eq!(reader.corpus_document_count(), 0);
        assert_eq!(reader.term_count(), 0);
        assert!(reader.open_disk_posting(1).is_err());
    }
}
