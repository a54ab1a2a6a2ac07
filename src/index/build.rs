use crate::index::types::IndexMeta;
use crate::index::writer::{IndexWriter, TokenizedDoc};
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Files tokenized in parallel per batch (bounds memory held at once)
const BATCH_SIZE: usize = 4096;

/// Largest document accepted, in bytes
const MAX_DOCUMENT_SIZE: u64 = 8 * 1024 * 1024;

/// Result of reading and tokenizing one file (computed in parallel)
struct ProcessedFile {
    url: String,
    text: String,
    doc: TokenizedDoc,
}

fn process_file(path: &Path, rel_path: &Path) -> Option<ProcessedFile> {
    let content = fs::read(path).ok()?;
    if content.len() as u64 > MAX_DOCUMENT_SIZE {
        return None;
    }

    // Only UTF-8 text documents are indexed
    let text = String::from_utf8(content).ok()?;
    let doc = TokenizedDoc::from_text(&text);

    Some(ProcessedFile {
        url: rel_path.to_string_lossy().into_owned(),
        text,
        doc,
    })
}

/// Index every text file under `corpus_dir` into `index_path`.
/// Each file becomes one document whose URL is its path relative to `corpus_dir`.
pub fn build_index(
    corpus_dir: &Path,
    index_path: &Path,
    include: Option<&str>,
    silent: bool,
) -> Result<IndexMeta> {
    let root = corpus_dir.canonicalize().context("Invalid corpus path")?;
    let matcher: Option<GlobMatcher> = include
        .map(|pattern| Glob::new(pattern).map(|g| g.compile_matcher()))
        .transpose()
        .context("Invalid include glob")?;

    if !silent {
        println!("Indexing: {}", root.display());
    }

    let walker = WalkBuilder::new(&root)
        .hidden(true)
        .git_ignore(true)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    // Sorted walk keeps document ids stable across rebuilds
    let file_entries: Vec<(PathBuf, PathBuf)> = walker
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let path = entry.path().to_path_buf();
            let rel_path = path.strip_prefix(&root).ok()?.to_path_buf();
            Some((path, rel_path))
        })
        .filter(|(_, rel_path)| matcher.as_ref().is_none_or(|m| m.is_match(rel_path)))
        .collect();

    let progress_bar = if !silent {
        let pb = ProgressBar::new(file_entries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress template")?
                .progress_chars("█▓▒░  "),
        );
        pb.set_message("Tokenizing documents...");
        Some(pb)
    } else {
        None
    };

    let mut writer = IndexWriter::new(index_path)?;
    let skipped = AtomicUsize::new(0);

    for batch in file_entries.chunks(BATCH_SIZE) {
        let processed: Vec<Option<ProcessedFile>> = batch
            .par_iter()
            .map(|(path, rel_path)| {
                let result = process_file(path, rel_path);
                if result.is_none() {
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                }
                result
            })
            .collect();

        // Sequential append preserves walk order as doc id order
        for file in processed.into_iter().flatten() {
            writer.add_tokenized(&file.url, &file.text, file.doc)?;
        }
    }

    let doc_count = writer.doc_count();
    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!("Processed {} documents", doc_count));
    }

    let meta = writer.commit()?;

    let skipped = skipped.load(Ordering::Relaxed);
    if skipped > 0 {
        tracing::warn!(skipped, "files skipped (unreadable, too large or not UTF-8)");
    }
    if !silent {
        println!("Index stored at: {}", index_path.display());
    }

    Ok(meta)
}
