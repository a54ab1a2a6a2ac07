use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::index::cache::PostingCache;
use crate::index::posting::TermPosting;
use crate::index::source::{PostingSource, TermDictionary};
use crate::query::merge::{MergeOp, MergeStrategy, PostingMerger};
use crate::query::occurs::capture_occurrences;
use crate::query::rank::{RankHit, RankedResults, TopKHeap};
use crate::query::scorer::{Bm25Scorer, QueryScorer, QueryTerm, ScoringPolicy};
use crate::utils::normalize_term;

/// Query executor
///
/// Holds no per-query state, so one executor can serve concurrent queries
/// as long as the index source is `Sync`.
pub struct QueryExecutor<'a, S: ?Sized> {
    source: &'a S,
    cache: Option<&'a PostingCache>,
    policy: Box<dyn ScoringPolicy>,
    strategy: MergeStrategy,
    result_capacity: usize,
    max_occurs: usize,
    proximity: bool,
    max_query_terms: usize,
    max_term_bytes: usize,
}

impl<'a, S> QueryExecutor<'a, S>
where
    S: TermDictionary + PostingSource + ?Sized,
{
    pub fn new(source: &'a S, config: &SearchConfig) -> Self {
        Self {
            source,
            cache: None,
            policy: Box::new(Bm25Scorer::new(config.scoring.clone())),
            strategy: MergeStrategy::default(),
            result_capacity: config.result_capacity,
            max_occurs: config.max_highlight_occurs,
            proximity: config.proximity,
            max_query_terms: config.max_query_terms,
            max_term_bytes: config.max_term_bytes,
        }
    }

    /// Serve terms found in `cache` from memory instead of disk
    pub fn with_cache(mut self, cache: &'a PostingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the default BM25 policy
    pub fn with_policy(mut self, policy: Box<dyn ScoringPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run a query: merge the terms' postings with `op`, score every
    /// candidate and keep the best `result_capacity` hits.
    pub fn execute_query<T: AsRef<str>>(&self, terms: &[T], op: MergeOp) -> Result<RankedResults> {
        if op == MergeOp::Undefined {
            return Err(SearchError::UndefinedMergeOp);
        }

        let query_terms = self.resolve_terms(terms)?;
        let cursors = self.open_cursors(&query_terms)?;

        tracing::debug!(
            total_docs = self.source.corpus_document_count(),
            avg_doc_len = self.source.average_document_length(),
            proximity = self.proximity,
            "BM25 arguments"
        );
        let scorer = QueryScorer::new(
            self.policy.as_ref(),
            &query_terms,
            self.source.average_document_length(),
            self.proximity,
        );
        let mut top_k = TopKHeap::new(self.result_capacity);
        let mut merger = PostingMerger::new(cursors, op)?.with_strategy(self.strategy);
        let mut candidates = 0usize;

        while let Some(m) = merger.next_match() {
            candidates += 1;
            let matched: Vec<_> = m.items().collect();
            let doc_len = self.source.document_length(m.doc_id);
            let score = scorer.score(&matched, doc_len);
            tracing::trace!(doc_id = m.doc_id, doc_len, score, "candidate scored");

            // Occurrences are only copied for hits that will be kept
            if top_k.would_enter(score) {
                let occurs = capture_occurrences(matched.iter().map(|&(_, item)| item), self.max_occurs);
                top_k.try_insert(RankHit::new(m.doc_id, score, occurs));
            }
        }
        merger.finish();

        let results = top_k.into_ranked();
        tracing::info!(
            terms = query_terms.len(),
            op = %op,
            candidates,
            hits = results.len(),
            "query executed"
        );

        Ok(results)
    }

    /// Validate and normalize raw terms, then look them up
    fn resolve_terms<T: AsRef<str>>(&self, terms: &[T]) -> Result<Vec<QueryTerm>> {
        if terms.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if terms.len() > self.max_query_terms {
            return Err(SearchError::TooManyTerms {
                max: self.max_query_terms,
                got: terms.len(),
            });
        }

        let corpus_docs = self.source.corpus_document_count();
        terms
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                if raw.len() > self.max_term_bytes {
                    return Err(SearchError::TermTooLong {
                        max: self.max_term_bytes,
                        len: raw.len(),
                    });
                }

                let text = normalize_term(raw);
                let term_id = self.source.lookup(&text);
                let doc_freq = term_id.map_or(0, |id| self.source.document_frequency(id));
                let idf = self.policy.idf(doc_freq, corpus_docs);

                match term_id {
                    Some(id) => tracing::debug!(term = %text, term_id = id, doc_freq, idf, "term found"),
                    None => tracing::debug!(term = %text, idf, "term not found"),
                }

                Ok(QueryTerm {
                    text,
                    term_id,
                    doc_freq,
                    idf,
                })
            })
            .collect()
    }

    /// One cursor per term, in term order
    fn open_cursors(&self, terms: &[QueryTerm]) -> Result<Vec<TermPosting<'a>>> {
        terms
            .iter()
            .map(|term| {
                let Some(term_id) = term.term_id else {
                    return Ok(TermPosting::Absent);
                };

                let cursor = match self.cache.and_then(|cache| cache.cursor(term_id)) {
                    Some(cached) => TermPosting::Cached(cached),
                    None => TermPosting::Disk(self.source.open_disk_posting(term_id)?),
                };
                tracing::debug!(term = %term.text, kind = cursor.kind(), "posting opened");
                Ok(cursor)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::DocId;
    use crate::index::writer::IndexWriter;
    use crate::index::IndexReader;
    use tempfile::TempDir;

    fn build(docs: &[&str]) -> (TempDir, IndexReader) {
        let dir = TempDir::new().unwrap();
        let mut writer = IndexWriter::new(dir.path()).unwrap();
        for (i, text) in docs.iter().enumerate() {
            writer.add_document(&format!("doc{}", i + 1), text).unwrap();
        }
        writer.commit().unwrap();
        let reader = IndexReader::open(dir.path()).unwrap();
        (dir, reader)
    }

    fn ids(results: &RankedResults) -> Vec<DocId> {
        let mut ids: Vec<DocId> = results.hits().iter().map(|h| h.doc_id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_and_or() {
        let (_dir, reader) = build(&["apple pie", "apple banana", "banana split"]);
        let executor = QueryExecutor::new(&reader, &SearchConfig::default());

        let and = executor.execute_query(&["apple", "banana"], MergeOp::And).unwrap();
        assert_eq!(ids(&and), vec![2]);

        let or = executor.execute_query(&["apple", "banana"], MergeOp::Or).unwrap();
        assert_eq!(ids(&or), vec![1, 2, 3]);
        // doc 2 matches both terms
        assert_eq!(or.hits()[0].doc_id, 2);
    }

    #[test]
    fn test_terms_are_normalized() {
        let (_dir, reader) = build(&["Apple pie"]);
        let executor = QueryExecutor::new(&reader, &SearchConfig::default());
        let results = executor.execute_query(&["  APPLE "], MergeOp::Or).unwrap();
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_validation_errors() {
        let (_dir, reader) = build(&["apple"]);
        let config = SearchConfig {
            max_query_terms: 2,
            max_term_bytes: 8,
            ..Default::default()
        };
        let executor = QueryExecutor::new(&reader, &config);

        let empty: [&str; 0] = [];
        assert!(matches!(
            executor.execute_query(&empty, MergeOp::Or),
            Err(SearchError::EmptyQuery)
        ));
        assert!(matches!(
            executor.execute_query(&["a", "b", "c"], MergeOp::Or),
            Err(SearchError::TooManyTerms { max: 2, got: 3 })
        ));
        assert!(matches!(
            executor.execute_query(&["abcdefghij"], MergeOp::Or),
            Err(SearchError::TermTooLong { max: 8, len: 10 })
        ));
        assert!(matches!(
            executor.execute_query(&["apple"], MergeOp::Undefined),
            Err(SearchError::UndefinedMergeOp)
        ));
    }

    #[test]
    fn test_occurrences_capped() {
        let text = vec!["ping"; 40].join(" ");
        let (_dir, reader) = build(&[text.as_str()]);
        let config = SearchConfig {
            max_highlight_occurs: 5,
            ..Default::default()
        };
        let executor = QueryExecutor::new(&reader, &config);

        let results = executor.execute_query(&["ping"], MergeOp::Or).unwrap();
        assert_eq!(results.hits()[0].occurs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cached_and_disk_agree() {
        let (_dir, reader) = build(&["red fish", "blue fish", "red blue", "one fish two fish"]);
        let config = SearchConfig::default();
        let cache = PostingCache::new(8);
        assert!(cache.warm(&reader, "fish").unwrap());

        let disk = QueryExecutor::new(&reader, &config);
        let cached = QueryExecutor::new(&reader, &config).with_cache(&cache);

        for op in [MergeOp::And, MergeOp::Or] {
            let a = disk.execute_query(&["fish", "red"], op).unwrap();
            let b = cached.execute_query(&["fish", "red"], op).unwrap();
            let a: Vec<_> = a.hits().iter().map(|h| (h.doc_id, h.score, h.occurs.clone())).collect();
            let b: Vec<_> = b.hits().iter().map(|h| (h.doc_id, h.score, h.occurs.clone())).collect();
            assert_eq!(a, b);
        }
        assert_eq!(cache.stats().0, 2);
    }

    struct FixedScore;

    impl ScoringPolicy for FixedScore {
        fn idf(&self, _doc_freq: u32, _corpus_docs: u32) -> f32 {
            1.0
        }

        fn term_score(&self, _idf: f32, _tf: u32, _doc_len: u32, _avg: f32) -> f32 {
            1.0
        }

        fn proximity_bonus(&self, _min_width: Option<u32>) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_custom_policy_ties_by_doc_id() {
        let (_dir, reader) = build(&["x", "x y", "x", "x"]);
        let config = SearchConfig {
            result_capacity: 2,
            ..Default::default()
        };
        let executor = QueryExecutor::new(&reader, &config).with_policy(Box::new(FixedScore));

        let results = executor.execute_query(&["x"], MergeOp::Or).unwrap();
        let ordered: Vec<DocId> = results.hits().iter().map(|h| h.doc_id).collect();
        assert_eq!(ordered, vec![1, 2]);
    }
}
