use crate::index::types::{PostingItem, Position};

/// Default number of occurrences kept per result for highlighting
pub const DEFAULT_MAX_OCCURS: usize = 16;

/// Copy occurrence positions from matching items, in term order, until
/// `cap` positions are collected.
///
/// Truncation only limits what is displayed; scoring always uses the
/// full term frequency.
pub fn capture_occurrences<'i, I>(items: I, cap: usize) -> Vec<Position>
where
    I: IntoIterator<Item = &'i PostingItem>,
{
    let mut occurs = Vec::with_capacity(cap.min(DEFAULT_MAX_OCCURS));
    for item in items {
        let room = cap - occurs.len();
        if room == 0 {
            break;
        }
        occurs.extend(item.positions.iter().take(room));
    }
    occurs
}
