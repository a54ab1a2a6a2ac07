//! Minimum covering window over several sorted position lists.

use crate::index::types::Position;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Width (`max - min`) of the smallest position range containing at least
/// one position from every non-empty sequence.
///
/// Each sequence must be ascending. Returns `None` when fewer than two
/// sequences are non-empty, since proximity is undefined for a single term.
pub fn min_window_width(sequences: &[&[Position]]) -> Option<u32> {
    let lists: Vec<&[Position]> = sequences.iter().copied().filter(|s| !s.is_empty()).collect();
    if lists.len() < 2 {
        return None;
    }

    // Min-heap of (head value, list index, offset within list)
    let mut heads: BinaryHeap<Reverse<(Position, usize, usize)>> =
        BinaryHeap::with_capacity(lists.len());
    let mut max = 0;
    for (i, list) in lists.iter().enumerate() {
        heads.push(Reverse((list[0], i, 0)));
        max = max.max(list[0]);
    }

    let mut best = u32::MAX;
    while let Some(Reverse((min, i, offset))) = heads.pop() {
        best = best.min(max - min);
        if best == 0 {
            break;
        }

        // Window can only shrink by moving its minimum forward
        let Some(&next) = lists[i].get(offset + 1) else {
            break;
        };
        max = max.max(next);
        heads.push(Reverse((next, i, offset + 1)));
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustive check over every combination, for small inputs
    fn brute_force(sequences: &[&[Position]]) -> Option<u32> {
        let lists: Vec<&[Position]> = sequences.iter().copied().filter(|s| !s.is_empty()).collect();
        if lists.len() < 2 {
            return None;
        }

        let mut best = u32::MAX;
        let mut idx = vec![0usize; lists.len()];
        loop {
            let values = idx.iter().enumerate().map(|(l, &i)| lists[l][i]);
            let lo = values.clone().min().unwrap_or(0);
            let hi = values.max().unwrap_or(0);
            best = best.min(hi - lo);

            let mut l = 0;
            loop {
                if l == lists.len() {
                    return Some(best);
                }
                idx[l] += 1;
                if idx[l] < lists[l].len() {
                    break;
                }
                idx[l] = 0;
                l += 1;
            }
        }
    }

    #[test]
    fn test_adjacent_terms() {
        assert_eq!(min_window_width(&[&[0], &[1]]), Some(1));
        assert_eq!(min_window_width(&[&[3, 10], &[0, 9]]), Some(1));
    }

    #[test]
    fn test_single_or_empty() {
        assert_eq!(min_window_width(&[]), None);
        assert_eq!(min_window_width(&[&[1, 2, 3]]), None);
        assert_eq!(min_window_width(&[&[1, 2, 3], &[]]), None);
    }

    #[test]
    fn test_three_sequences() {
        let a: &[Position] = &[4, 10, 15, 24, 26];
        let b: &[Position] = &[0, 9, 12, 20];
        let c: &[Position] = &[5, 18, 22, 30];
        // 20, 22, 24
        assert_eq!(min_window_width(&[a, b, c]), Some(4));
    }

    #[test]
    fn test_same_position() {
        assert_eq!(min_window_width(&[&[2, 7], &[7]]), Some(0));
    }

    #[test]
    fn test_matches_brute_force() {
        let cases: Vec<Vec<Vec<Position>>> = vec![
            vec![vec![1, 50, 90], vec![45, 95], vec![48]],
            vec![vec![0, 1, 2], vec![100], vec![3, 99]],
            vec![vec![7], vec![2, 3, 4, 5, 6], vec![8, 9]],
            vec![vec![10, 20, 30, 40], vec![15, 35], vec![], vec![31]],
        ];

        for case in &cases {
            let refs: Vec<&[Position]> = case.iter().map(|v| v.as_slice()).collect();
            assert_eq!(min_window_width(&refs), brute_force(&refs), "{case:?}");
        }
    }
}
