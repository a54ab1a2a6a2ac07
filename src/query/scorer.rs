//! Relevance scoring.
//!
//! Scores combine per-term BM25 contributions with an optional bonus for
//! query terms occurring close together. The formulas live behind
//! [`ScoringPolicy`] so alternative rankings can be plugged in; the
//! required properties are:
//!
//! - IDF is finite for document frequency 0 and non-increasing in it
//! - a term's contribution is non-decreasing in its frequency
//! - the proximity bonus is non-increasing in window width, and 0 when
//!   fewer than two terms match

use crate::index::types::{PostingItem, TermId};
use crate::query::proximity::min_window_width;
use serde::{Deserialize, Serialize};

/// Configurable weights for scoring factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Term frequency saturation
    pub k1: f32,
    /// Document length normalization strength (0 disables it)
    pub b: f32,
    /// Bonus for a zero-width window; decays as 1 / (1 + width)
    pub proximity_weight: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            proximity_weight: 1.0,
        }
    }
}

/// Pluggable ranking formulas
pub trait ScoringPolicy: Send + Sync {
    /// Weight of a term given its document frequency
    fn idf(&self, doc_freq: u32, corpus_docs: u32) -> f32;

    /// Contribution of one term to one document's score
    fn term_score(&self, idf: f32, tf: u32, doc_len: u32, avg_doc_len: f32) -> f32;

    /// Bonus for the tightest window covering all matching terms
    fn proximity_bonus(&self, min_width: Option<u32>) -> f32;
}

/// Okapi BM25 with an inverse-width proximity bonus
#[derive(Debug, Clone, Default)]
pub struct Bm25Scorer {
    weights: ScoringWeights,
}

impl Bm25Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Create a scorer with default weights
    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default())
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

impl ScoringPolicy for Bm25Scorer {
    fn idf(&self, doc_freq: u32, corpus_docs: u32) -> f32 {
        let n = corpus_docs as f32;
        let df = doc_freq.min(corpus_docs) as f32;
        // The +1 keeps the weight positive even for terms in every document
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn term_score(&self, idf: f32, tf: u32, doc_len: u32, avg_doc_len: f32) -> f32 {
        if tf == 0 {
            return 0.0;
        }

        let ScoringWeights { k1, b, .. } = self.weights;
        let length_ratio = if avg_doc_len > 0.0 {
            doc_len as f32 / avg_doc_len
        } else {
            1.0
        };

        let tf = tf as f32;
        idf * tf * (k1 + 1.0) / (tf + k1 * (1.0 - b + b * length_ratio))
    }

    fn proximity_bonus(&self, min_width: Option<u32>) -> f32 {
        match min_width {
            Some(width) => self.weights.proximity_weight / (1.0 + width as f32),
            None => 0.0,
        }
    }
}

/// A query term after dictionary lookup
#[derive(Debug, Clone)]
pub struct QueryTerm {
    /// Normalized term text
    pub text: String,
    /// `None` when the term is not in the dictionary
    pub term_id: Option<TermId>,
    pub doc_freq: u32,
    pub idf: f32,
}

/// Per-query scoring state: term weights are computed once, up front
pub struct QueryScorer<'p> {
    policy: &'p dyn ScoringPolicy,
    idfs: Vec<f32>,
    avg_doc_len: f32,
    proximity: bool,
}

impl<'p> QueryScorer<'p> {
    pub fn new(
        policy: &'p dyn ScoringPolicy,
        terms: &[QueryTerm],
        avg_doc_len: f32,
        proximity: bool,
    ) -> Self {
        Self {
            policy,
            idfs: terms.iter().map(|t| t.idf).collect(),
            avg_doc_len,
            proximity,
        }
    }

    /// Score one document from its matching `(term index, item)` pairs
    pub fn score(&self, matches: &[(usize, &PostingItem)], doc_len: u32) -> f32 {
        let mut score: f32 = matches
            .iter()
            .map(|&(i, item)| self.policy.term_score(self.idfs[i], item.tf, doc_len, self.avg_doc_len))
            .sum();

        if self.proximity && matches.len() >= 2 {
            let positions: Vec<&[u32]> = matches.iter().map(|(_, item)| item.positions.as_slice()).collect();
            score += self.policy.proximity_bonus(min_window_width(&positions));
        }

        score
    }
}
