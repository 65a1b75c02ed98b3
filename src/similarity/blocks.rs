use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Common contiguous run of two sequences: `a[start_a..start_a + length]` is equal to
/// `b[start_b..start_b + length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchingBlock {
    pub start_a: usize,
    pub start_b: usize,
    pub length: usize,
}

impl MatchingBlock {
    pub const fn end_a(&self) -> usize {
        self.start_a + self.length
    }

    pub const fn end_b(&self) -> usize {
        self.start_b + self.length
    }
}

/// Enumerates the non overlapping blocks common to both sequences, sorted by their start in `a`.
///
/// The longest block is found first, then the search is repeated on the subsequences before and
/// after it. Among blocks of the same length the one that starts first in `a` wins, then the one
/// that starts first in `b`. Blocks that are adjacent in both sequences are merged.
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<MatchingBlock> {
    let mut b_positions: FxHashMap<&T, Vec<usize>> = FxHashMap::default();
    for (j, element) in b.iter().enumerate() {
        b_positions.entry(element).or_default().push(j);
    }

    let mut blocks = Vec::new();
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
        let block = longest_match(a, &b_positions, (a_lo, a_hi), (b_lo, b_hi));
        if block.length == 0 {
            continue;
        }

        if a_lo < block.start_a && b_lo < block.start_b {
            queue.push((a_lo, block.start_a, b_lo, block.start_b));
        }
        if block.end_a() < a_hi && block.end_b() < b_hi {
            queue.push((block.end_a(), a_hi, block.end_b(), b_hi));
        }
        blocks.push(block);
    }

    blocks.sort_unstable();
    merge_adjacent(blocks)
}

/// Longest block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`, with length 0 if there is none.
fn longest_match<T: Eq + Hash>(
    a: &[T],
    b_positions: &FxHashMap<&T, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> MatchingBlock {
    let mut best = MatchingBlock {
        start_a: a_lo,
        start_b: b_lo,
        length: 0,
    };

    // length of the block ending at a[i - 1] and b[j], by j
    let mut lengths: FxHashMap<usize, usize> = FxHashMap::default();

    for (i, element) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_lengths = FxHashMap::default();

        let positions = b_positions.get(element).map(Vec::as_slice).unwrap_or_default();
        for &j in positions.iter().filter(|&&j| j >= b_lo).take_while(|&&j| j < b_hi) {
            let previous = j
                .checked_sub(1)
                .and_then(|j| lengths.get(&j))
                .copied()
                .unwrap_or(0);
            let length = previous + 1;
            next_lengths.insert(j, length);

            if length > best.length {
                best = MatchingBlock {
                    start_a: i + 1 - length,
                    start_b: j + 1 - length,
                    length,
                };
            }
        }

        lengths = next_lengths;
    }

    best
}

fn merge_adjacent(blocks: Vec<MatchingBlock>) -> Vec<MatchingBlock> {
    let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len());

    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.end_a() == block.start_a && last.end_b() == block.start_b => {
                last.length += block.length;
            }
            _ => merged.push(block),
        }
    }

    merged
}
