//! # termsearch - ranked term search over positional posting lists
//!
//! Given a list of query terms and a boolean mode, termsearch walks each
//! term's posting list, merges them, scores every candidate document and
//! keeps the best K hits for paged, highlighted display.
//!
//! ## Architecture
//!
//! - [`index`] - Posting cursors, the index reader/writer and blob storage
//! - [`query`] - N-way merge, scoring, top-K selection and highlighting
//! - [`config`] - Search configuration
//! - [`output`] - Result page printing
//! - [`utils`] - Varint encoding and word segmentation
//!
//! ## Quick Start
//!
//! ```ignore
//! use termsearch::config::SearchConfig;
//! use termsearch::index::IndexReader;
//! use termsearch::query::{MergeOp, QueryExecutor};
//! use std::path::Path;
//!
//! let reader = IndexReader::open(Path::new("/path/to/index")).unwrap();
//! let executor = QueryExecutor::new(&reader, &SearchConfig::default());
//! let results = executor.execute_query(&["give", "up", "dream"], MergeOp::And).unwrap();
//!
//! let (page, total_pages) = results.page(0, 10);
//! for hit in page {
//!     println!("doc#{} score={:.3}", hit.doc_id, hit.score);
//! }
//! ```
//!
//! ## Posting cursors
//!
//! Terms are read either straight from the mmap'd posting file or from a
//! decoded in-memory snapshot kept in a shared LRU cache. Both implement
//! [`index::PostingCursor`], so the merge never knows which one it drives.

pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;
