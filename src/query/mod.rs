pub mod executor;
pub mod highlight;
pub mod merge;
pub mod occurs;
pub mod proximity;
pub mod rank;
pub mod scorer;

pub use executor::QueryExecutor;
pub use highlight::HighlightContext;
pub use merge::{MergeMatch, MergeOp, MergeStrategy, PostingMerger};
pub use occurs::capture_occurrences;
pub use rank::{RankHit, RankWindow, RankedResults, TopKHeap};
pub use scorer::{Bm25Scorer, QueryScorer, QueryTerm, ScoringPolicy, ScoringWeights};
