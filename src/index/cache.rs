//! Shared cache of decoded posting lists.
//!
//! Entries are immutable `Arc<[PostingItem]>` snapshots. Each query wraps a
//! snapshot in its own [`CachedPosting`], so concurrent queries never share
//! cursor state; the mutex only guards the LRU bookkeeping.

use crate::error::Result;
use crate::index::posting::CachedPosting;
use crate::index::source::{PostingSource, TermDictionary};
use crate::index::types::{PostingItem, TermId};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// LRU cache of posting snapshots keyed by term id
pub struct PostingCache {
    /// `None` when caching is disabled (capacity 0)
    entries: Option<Mutex<LruCache<TermId, Arc<[PostingItem]>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PostingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Cursor over the cached snapshot of a term, if present
    pub fn cursor(&self, term_id: TermId) -> Option<CachedPosting> {
        let snapshot = self
            .entries
            .as_ref()
            .and_then(|entries| entries.lock().ok())
            .and_then(|mut cache| cache.get(&term_id).cloned());

        match snapshot {
            Some(items) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(CachedPosting::new(items))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, term_id: TermId, items: Arc<[PostingItem]>) {
        if let Some(entries) = &self.entries
            && let Ok(mut cache) = entries.lock()
        {
            cache.put(term_id, items);
        }
    }

    /// Fork a term's disk posting into the cache. Returns false when the
    /// term is unknown or caching is disabled.
    pub fn warm<S>(&self, source: &S, term: &str) -> Result<bool>
    where
        S: TermDictionary + PostingSource + ?Sized,
    {
        if !self.is_enabled() {
            return Ok(false);
        }
        let Some(term_id) = source.lookup(term) else {
            return Ok(false);
        };

        let disk = source.open_disk_posting(term_id)?;
        let cached = CachedPosting::fork(&disk)?;
        tracing::debug!(term, term_id, docs = cached.len(), "posting cached");
        self.insert(term_id, cached.snapshot());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|entries| entries.lock().ok().map(|cache| cache.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::PostingCursor;

    fn snapshot(ids: &[u32]) -> Arc<[PostingItem]> {
        ids.iter()
            .map(|&id| PostingItem::new(id, vec![0]))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = PostingCache::new(4);
        assert!(cache.cursor(1).is_none());

        cache.insert(1, snapshot(&[3, 5]));
        let mut cursor = cache.cursor(1).unwrap();
        assert!(cursor.start());
        assert_eq!(cursor.current_id(), Some(3));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = PostingCache::new(2);
        cache.insert(1, snapshot(&[1]));
        cache.insert(2, snapshot(&[2]));
        assert!(cache.cursor(1).is_some());
        cache.insert(3, snapshot(&[3]));

        assert_eq!(cache.len(), 2);
        assert!(cache.cursor(2).is_none());
        assert!(cache.cursor(1).is_some());
        assert!(cache.cursor(3).is_some());
    }

    #[test]
    fn test_disabled() {
        let cache = PostingCache::new(0);
        cache.insert(1, snapshot(&[1]));
        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
        assert!(cache.cursor(1).is_none());
    }

    #[test]
    fn test_cursors_share_snapshot_not_position() {
        let cache = PostingCache::new(1);
        cache.insert(9, snapshot(&[1, 2, 3]));

        let mut a = cache.cursor(9).unwrap();
        let mut b = cache.cursor(9).unwrap();
        a.start();
        a.next();
        b.start();
        assert_eq!(a.current_id(), Some(2));
        assert_eq!(b.current_id(), Some(1));
    }
}
