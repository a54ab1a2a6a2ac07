//! Utility functions shared by the index and query layers.
//!
//! ## Modules
//!
//! - [`encoding`] - Variable-length integer and posting record encoding
//! - [`tokenizer`] - Unicode word segmentation and term normalization
//!
//! ## Key Functions
//!
//! ```no_run
//! use termsearch::utils::{encode_varint, segments};
//!
//! let mut buf = Vec::new();
//! encode_varint(300, &mut buf);
//! // Returns: [0xac, 0x02]
//!
//! let words: Vec<_> = segments("Give up, dream!").map(|s| s.text).collect();
//! // Returns: ["Give", "up", "dream"]
//! ```

pub mod encoding;
pub mod tokenizer;

pub use encoding::*;
pub use tokenizer::*;
