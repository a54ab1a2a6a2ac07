//! Posting list cursors.
//!
//! A query walks each term's posting list through the [`PostingCursor`]
//! capability set. Two concrete variants exist:
//!
//! - [`DiskPosting`] decodes records on demand from the index's mmap'd
//!   posting region.
//! - [`CachedPosting`] iterates an owned, immutable snapshot of a posting
//!   list. Snapshots are shared behind an `Arc`; every cursor keeps its own
//!   position, so a cached posting can be walked by several queries at once
//!   while the disk posting it was forked from is consumed elsewhere.
//!
//! [`TermPosting`] is the per-query tagged union over both variants plus the
//! cursor of a term that is absent from the dictionary.

use crate::error::{Result, SearchError};
use crate::index::types::{DocId, MAX_DOC_ID, PostingItem, TermId};
use crate::utils::{decode_posting, skip_posting};
use std::sync::Arc;

/// Sequential access to one term's posting list, in ascending document order
pub trait PostingCursor {
    /// Position at the first document. Returns false (and is exhausted) if
    /// the posting is empty. Calling it again restarts iteration.
    fn start(&mut self) -> bool;

    /// Advance to the next document. Returns false once exhausted.
    fn next(&mut self) -> bool;

    /// Advance to the first document with id >= `target`.
    ///
    /// Returns false without touching the cursor if `target` is outside the
    /// document id domain. Returns false and exhausts the cursor if no such
    /// document exists.
    fn jump(&mut self, target: u64) -> bool;

    /// Current document id, `None` once exhausted or before `start`
    fn current_id(&self) -> Option<DocId>;

    /// Current posting record
    fn current_item(&self) -> Option<&PostingItem>;

    /// Release buffers. The cursor reports exhausted afterwards.
    fn finish(&mut self);
}

/// Narrow a 64-bit jump target to a document id.
/// The range check happens on the wide value, before any cast.
#[inline]
pub fn jump_target(target: u64) -> Option<DocId> {
    if target > MAX_DOC_ID as u64 {
        None
    } else {
        Some(target as DocId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Unstarted,
    Active,
    Exhausted,
}

/// Cursor decoding a posting list straight from index storage
#[derive(Debug, Clone)]
pub struct DiskPosting<'a> {
    term_id: TermId,
    data: &'a [u8],
    doc_freq: u32,
    /// Byte offset of the next undecoded record
    offset: usize,
    /// Records consumed so far
    read: u32,
    /// Document id of the last consumed record
    prev_doc: DocId,
    item: PostingItem,
    state: CursorState,
    corrupt: bool,
}

impl<'a> DiskPosting<'a> {
    pub fn new(term_id: TermId, data: &'a [u8], doc_freq: u32) -> Self {
        Self {
            term_id,
            data,
            doc_freq,
            offset: 0,
            read: 0,
            prev_doc: 0,
            item: PostingItem::default(),
            state: CursorState::Unstarted,
            corrupt: false,
        }
    }

    pub fn term_id(&self) -> TermId {
        self.term_id
    }

    pub fn doc_freq(&self) -> u32 {
        self.doc_freq
    }

    /// True if decoding stopped on malformed bytes
    pub fn is_corrupt(&self) -> bool {
        self.corrupt
    }

    fn has_more(&self) -> bool {
        self.read < self.doc_freq && self.offset < self.data.len()
    }

    fn mark_corrupt(&mut self) -> bool {
        tracing::warn!(term_id = self.term_id, offset = self.offset, "corrupt posting record");
        self.corrupt = true;
        self.state = CursorState::Exhausted;
        false
    }

    fn decode_next(&mut self) -> bool {
        if !self.has_more() {
            self.state = CursorState::Exhausted;
            return false;
        }

        match decode_posting(&self.data[self.offset..], self.prev_doc, &mut self.item) {
            Some(consumed) => {
                self.offset += consumed;
                self.read += 1;
                self.prev_doc = self.item.doc_id;
                self.state = CursorState::Active;
                true
            }
            None => self.mark_corrupt(),
        }
    }
}

impl PostingCursor for DiskPosting<'_> {
    fn start(&mut self) -> bool {
        self.offset = 0;
        self.read = 0;
        self.prev_doc = 0;
        self.corrupt = false;
        self.decode_next()
    }

    fn next(&mut self) -> bool {
        match self.state {
            CursorState::Exhausted => false,
            _ => self.decode_next(),
        }
    }

    fn jump(&mut self, target: u64) -> bool {
        let Some(target) = jump_target(target) else {
            return false;
        };

        match self.state {
            CursorState::Exhausted => return false,
            CursorState::Unstarted => {
                if !self.decode_next() {
                    return false;
                }
            }
            CursorState::Active => {}
        }

        if self.item.doc_id >= target {
            return true;
        }

        // Skip whole records without materializing their positions
        while self.has_more() {
            match skip_posting(&self.data[self.offset..], self.prev_doc) {
                Some((doc_id, consumed)) if doc_id < target => {
                    self.offset += consumed;
                    self.read += 1;
                    self.prev_doc = doc_id;
                }
                Some(_) => return self.decode_next(),
                None => return self.mark_corrupt(),
            }
        }

        self.state = CursorState::Exhausted;
        false
    }

    fn current_id(&self) -> Option<DocId> {
        (self.state == CursorState::Active).then_some(self.item.doc_id)
    }

    fn current_item(&self) -> Option<&PostingItem> {
        (self.state == CursorState::Active).then_some(&self.item)
    }

    fn finish(&mut self) {
        self.data = &[];
        self.item = PostingItem::default();
        self.state = CursorState::Exhausted;
    }
}

/// Cursor over an in-memory posting snapshot
#[derive(Debug, Clone)]
pub struct CachedPosting {
    items: Arc<[PostingItem]>,
    pos: usize,
    state: CursorState,
}

impl CachedPosting {
    /// Wrap a shared snapshot. The new cursor starts unpositioned.
    pub fn new(items: Arc<[PostingItem]>) -> Self {
        Self {
            items,
            pos: 0,
            state: CursorState::Unstarted,
        }
    }

    /// Build a snapshot from owned items (must be in ascending doc order)
    pub fn from_items(items: Vec<PostingItem>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        Self::new(items.into())
    }

    /// Fork a disk posting into an independent in-memory snapshot.
    ///
    /// The whole list is decoded from a private copy of the disk cursor, so
    /// the source cursor's position is left untouched.
    pub fn fork(disk: &DiskPosting<'_>) -> Result<Self> {
        let mut stream = DiskPosting::new(disk.term_id, disk.data, disk.doc_freq);
        // Every record takes at least two bytes, whatever the stored doc_freq says
        let mut items = Vec::with_capacity((disk.doc_freq as usize).min(disk.data.len() / 2));

        let mut more = stream.start();
        while more {
            items.push(stream.item.clone());
            more = stream.next();
        }

        if stream.is_corrupt() {
            return Err(SearchError::CorruptPosting(disk.term_id));
        }

        Ok(Self::from_items(items))
    }

    /// Shared snapshot backing this cursor
    pub fn snapshot(&self) -> Arc<[PostingItem]> {
        Arc::clone(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PostingCursor for CachedPosting {
    fn start(&mut self) -> bool {
        self.pos = 0;
        self.state = if self.items.is_empty() {
            CursorState::Exhausted
        } else {
            CursorState::Active
        };
        self.state == CursorState::Active
    }

    fn next(&mut self) -> bool {
        match self.state {
            CursorState::Unstarted => self.start(),
            CursorState::Exhausted => false,
            CursorState::Active => {
                self.pos += 1;
                if self.pos >= self.items.len() {
                    self.state = CursorState::Exhausted;
                    false
                } else {
                    true
                }
            }
        }
    }

    fn jump(&mut self, target: u64) -> bool {
        let Some(target) = jump_target(target) else {
            return false;
        };

        if self.state == CursorState::Unstarted && !self.start() {
            return false;
        }
        if self.state == CursorState::Exhausted {
            return false;
        }

        if self.items[self.pos].doc_id >= target {
            return true;
        }

        let idx = self.pos + self.items[self.pos..].partition_point(|it| it.doc_id < target);
        if idx >= self.items.len() {
            self.state = CursorState::Exhausted;
            false
        } else {
            self.pos = idx;
            true
        }
    }

    fn current_id(&self) -> Option<DocId> {
        self.current_item().map(|it| it.doc_id)
    }

    fn current_item(&self) -> Option<&PostingItem> {
        match self.state {
            CursorState::Active => self.items.get(self.pos),
            _ => None,
        }
    }

    fn finish(&mut self) {
        self.items = Arc::from(Vec::new());
        self.pos = 0;
        self.state = CursorState::Exhausted;
    }
}

/// Posting cursor chosen for one query term
#[derive(Debug, Clone)]
pub enum TermPosting<'a> {
    Disk(DiskPosting<'a>),
    Cached(CachedPosting),
    /// Term missing from the dictionary: always exhausted
    Absent,
}

impl TermPosting<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            TermPosting::Disk(_) => "disk",
            TermPosting::Cached(_) => "cached",
            TermPosting::Absent => "absent",
        }
    }
}

impl PostingCursor for TermPosting<'_> {
    fn start(&mut self) -> bool {
        match self {
            TermPosting::Disk(p) => p.start(),
            TermPosting::Cached(p) => p.start(),
            TermPosting::Absent => false,
        }
    }

    fn next(&mut self) -> bool {
        match self {
            TermPosting::Disk(p) => p.next(),
            TermPosting::Cached(p) => p.next(),
            TermPosting::Absent => false,
        }
    }

    fn jump(&mut self, target: u64) -> bool {
        match self {
            TermPosting::Disk(p) => p.jump(target),
            TermPosting::Cached(p) => p.jump(target),
            TermPosting::Absent => false,
        }
    }

    fn current_id(&self) -> Option<DocId> {
        match self {
            TermPosting::Disk(p) => p.current_id(),
            TermPosting::Cached(p) => p.current_id(),
            TermPosting::Absent => None,
        }
    }

    fn current_item(&self) -> Option<&PostingItem> {
        match self {
            TermPosting::Disk(p) => p.current_item(),
            TermPosting::Cached(p) => p.current_item(),
            TermPosting::Absent => None,
        }
    }

    fn finish(&mut self) {
        match self {
            TermPosting::Disk(p) => p.finish(),
            TermPosting::Cached(p) => p.finish(),
            TermPosting::Absent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encode_posting;

    fn encode(items: &[PostingItem]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut prev = 0;
        for item in items {
            encode_posting(item, prev, &mut buf);
            prev = item.doc_id;
        }
        buf
    }

    fn sample() -> Vec<PostingItem> {
        vec![
            PostingItem::new(1, vec![0, 5]),
            PostingItem::new(4, vec![2]),
            PostingItem::new(9, vec![1, 3, 7]),
            PostingItem::new(20, vec![0]),
        ]
    }

    fn drain<C: PostingCursor>(cursor: &mut C) -> Vec<DocId> {
        let mut ids = Vec::new();
        let mut more = cursor.start();
        while more {
            ids.push(cursor.current_id().unwrap());
            more = cursor.next();
        }
        ids
    }

    #[test]
    fn test_disk_posting_iteration() {
        let items = sample();
        let bytes = encode(&items);
        let mut disk = DiskPosting::new(1, &bytes, items.len() as u32);

        assert_eq!(disk.current_id(), None);
        assert!(disk.start());
        assert_eq!(disk.current_item(), Some(&items[0]));
        assert!(disk.next());
        assert_eq!(disk.current_item().unwrap().positions, vec![2]);

        assert_eq!(drain(&mut disk), vec![1, 4, 9, 20]);
        assert_eq!(disk.current_id(), None);
        assert!(!disk.next());
    }

    #[test]
    fn test_empty_posting_is_exhausted() {
        let mut disk = DiskPosting::new(1, &[], 0);
        assert!(!disk.start());
        assert_eq!(disk.current_id(), None);

        let mut cached = CachedPosting::from_items(Vec::new());
        assert!(!cached.start());
        assert!(!cached.jump(1));

        let mut absent = TermPosting::Absent;
        assert!(!absent.start());
        assert_eq!(absent.current_item(), None);
    }

    #[test]
    fn test_jump_forward() {
        let items = sample();
        let bytes = encode(&items);
        let mut disk = DiskPosting::new(1, &bytes, items.len() as u32);
        let mut cached = CachedPosting::from_items(items.clone());

        for cursor in [&mut disk as &mut dyn PostingCursor, &mut cached] {
            assert!(cursor.start());
            assert!(cursor.jump(5));
            assert_eq!(cursor.current_id(), Some(9));
            assert_eq!(cursor.current_item().unwrap().positions, vec![1, 3, 7]);

            // target behind the cursor: no movement
            assert!(cursor.jump(2));
            assert_eq!(cursor.current_id(), Some(9));

            assert!(cursor.jump(20));
            assert_eq!(cursor.current_id(), Some(20));

            assert!(!cursor.jump(21));
            assert_eq!(cursor.current_id(), None);
        }
    }

    #[test]
    fn test_jump_out_of_domain_leaves_cursor() {
        let items = sample();
        let bytes = encode(&items);
        let mut disk = DiskPosting::new(1, &bytes, items.len() as u32);
        let mut cached = CachedPosting::from_items(items);

        let targets = [MAX_DOC_ID as u64 + 1, u32::MAX as u64, 1 << 32, u64::MAX];
        for cursor in [&mut disk as &mut dyn PostingCursor, &mut cached] {
            assert!(cursor.start());
            assert!(cursor.next());
            for &target in &targets {
                assert!(!cursor.jump(target));
                assert_eq!(cursor.current_id(), Some(4));
            }
            assert!(cursor.next());
            assert_eq!(cursor.current_id(), Some(9));
        }
    }

    #[test]
    fn test_jump_before_start() {
        let items = sample();
        let bytes = encode(&items);
        let mut disk = DiskPosting::new(1, &bytes, items.len() as u32);
        assert!(disk.jump(4));
        assert_eq!(disk.current_id(), Some(4));

        let mut cached = CachedPosting::from_items(items);
        assert!(cached.jump(10));
        assert_eq!(cached.current_id(), Some(20));
    }

    #[test]
    fn test_fork_is_independent() {
        let items = sample();
        let bytes = encode(&items);
        let mut disk = DiskPosting::new(3, &bytes, items.len() as u32);
        assert!(disk.start());
        assert!(disk.next());

        let mut forked = CachedPosting::fork(&disk).unwrap();
        assert_eq!(forked.len(), 4);
        assert_eq!(disk.current_id(), Some(4));

        let mut other = CachedPosting::new(forked.snapshot());
        assert!(forked.start());
        assert!(forked.jump(9));
        assert!(other.start());
        assert_eq!(other.current_id(), Some(1));
        assert_eq!(forked.current_id(), Some(9));

        assert_eq!(drain(&mut forked), vec![1, 4, 9, 20]);
        assert!(disk.next());
        assert_eq!(disk.current_id(), Some(9));
    }

    #[test]
    fn test_corrupt_posting() {
        let items = sample();
        let mut bytes = encode(&items);
        bytes.truncate(bytes.len() - 1);
        let mut disk = DiskPosting::new(5, &bytes, items.len() as u32);

        assert_eq!(drain(&mut disk), vec![1, 4, 9]);
        assert!(disk.is_corrupt());
        assert!(matches!(
            CachedPosting::fork(&disk),
            Err(SearchError::CorruptPosting(5))
        ));
    }

    #[test]
    fn test_finish_releases() {
        let items = sample();
        let bytes = encode(&items);
        let mut posting = TermPosting::Disk(DiskPosting::new(1, &bytes, 4));
        assert_eq!(posting.kind(), "disk");
        assert!(posting.start());
        posting.finish();
        assert_eq!(posting.current_id(), None);
        assert!(!posting.next());

        let mut cached = TermPosting::Cached(CachedPosting::from_items(items));
        assert!(cached.start());
        cached.finish();
        assert_eq!(cached.current_id(), None);
    }
}
