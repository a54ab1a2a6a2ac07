use crate::error::{Result, SearchError};
use crate::index::map_file;
use crate::index::types::{BlobCodec, DocId};
use crate::utils::{u64_at, write_u64_le};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// zstd level used for document text
const ZSTD_LEVEL: i32 = 3;

/// Per-document payload store (URLs, document text).
///
/// `<name>.blob` holds the concatenated payloads; `<name>.offsets` holds
/// `doc_count + 1` little-endian u64 offsets into it. Document ids start at 1.
pub struct BlobStore {
    blob: Option<Mmap>,
    offsets: Option<Mmap>,
    codec: BlobCodec,
}

impl BlobStore {
    pub fn open(index_path: &Path, name: &str, codec: BlobCodec) -> anyhow::Result<Self> {
        Ok(Self {
            blob: map_file(&index_path.join(format!("{name}.blob")))?,
            offsets: map_file(&index_path.join(format!("{name}.offsets")))?,
            codec,
        })
    }

    pub fn codec(&self) -> BlobCodec {
        self.codec
    }

    /// Raw (still encoded) payload of a document
    pub fn read(&self, doc_id: DocId) -> Option<&[u8]> {
        let idx = (doc_id as usize).checked_sub(1)?;
        let offsets = self.offsets.as_deref()?;
        let start = u64_at(offsets, idx)? as usize;
        let end = u64_at(offsets, idx + 1)? as usize;

        if start > end {
            return None;
        }
        self.blob.as_deref().unwrap_or(&[]).get(start..end)
    }

    /// Decoded payload of a document as text, at most `max_out` bytes.
    /// The buffer is owned by the caller; nothing is shared between calls.
    pub fn read_text(&self, doc_id: DocId, max_out: usize) -> Result<String> {
        let raw = self.read(doc_id).ok_or(SearchError::BlobNotFound(doc_id))?;

        let text = match self.codec {
            BlobCodec::Raw => {
                let end = raw.len().min(max_out);
                String::from_utf8_lossy(&raw[..end]).into_owned()
            }
            BlobCodec::Zstd => {
                let bytes = zstd::bulk::decompress(raw, max_out)
                    .map_err(|source| SearchError::Decompress { doc_id, source })?;
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };

        Ok(text)
    }
}

/// Append-only writer for a [`BlobStore`]
pub struct BlobWriter {
    blob: BufWriter<File>,
    offsets: Vec<u64>,
    codec: BlobCodec,
}

impl BlobWriter {
    pub fn create(index_path: &Path, name: &str, codec: BlobCodec) -> anyhow::Result<Self> {
        let file = File::create(index_path.join(format!("{name}.blob")))?;
        Ok(Self {
            blob: BufWriter::new(file),
            offsets: vec![0],
            codec,
        })
    }

    /// Append the next document's payload
    pub fn append(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let written = match self.codec {
            BlobCodec::Raw => {
                self.blob.write_all(data)?;
                data.len()
            }
            BlobCodec::Zstd => {
                let compressed = zstd::bulk::compress(data, ZSTD_LEVEL)?;
                self.blob.write_all(&compressed)?;
                compressed.len()
            }
        };

        let last = self.offsets.last().copied().unwrap_or(0);
        self.offsets.push(last + written as u64);
        Ok(())
    }

    pub fn finish(mut self, index_path: &Path, name: &str) -> anyhow::Result<()> {
        self.blob.flush()?;

        let file = File::create(index_path.join(format!("{name}.offsets")))?;
        let mut writer = BufWriter::new(file);
        for offset in &self.offsets {
            write_u64_le(&mut writer, *offset)?;
        }
        writer.flush()?;
        Ok(())
    }
}
