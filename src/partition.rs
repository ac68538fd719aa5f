// SPDX-License-Identifier: MIT

//! Partition descriptors: the ways `[0, n)` is handed out to a team.
//!
//! Fixed descriptors (even split, static) give each member at most one
//! range, decided before any work starts. Queue descriptors (dynamic,
//! guided) keep an atomic cursor that idle members claim from until the
//! range is exhausted.

use crate::error::ConfigError;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

/// Number of elements taken by one claim from a [`ChunkQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    /// Single-element claims.
    pub const ONE: ChunkSize = ChunkSize(NonZeroUsize::MIN);

    pub fn new(size: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(size)
            .map(ChunkSize)
            .ok_or(ConfigError::ZeroChunkSize)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A struct for splitting a range of items into evenly distributed chunks.
///
/// The first `total_items % num_chunks` chunks carry one extra item. Once
/// every item is assigned no further (empty) chunks are produced.
pub struct BalancedSplitter {
    /// Total number of items to be split into chunks.
    total_items: usize,
    /// The current position in the range of items.
    current_position: usize,
    /// The index of the current chunk being processed.
    current_chunk_index: usize,
    /// The base size of each chunk (without considering extra items).
    base_chunk_size: usize,
    /// The number of extra items to distribute across the first few chunks.
    extra_items: usize,
}

impl BalancedSplitter {
    /// Creates a splitter dividing `total_items` into `num_chunks`.
    pub fn new(total_items: usize, num_chunks: NonZeroUsize) -> Self {
        let num_chunks = num_chunks.get();
        BalancedSplitter {
            total_items,
            current_position: 0,
            current_chunk_index: 0,
            base_chunk_size: total_items / num_chunks,
            extra_items: total_items % num_chunks,
        }
    }
}

impl Iterator for BalancedSplitter {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.current_position;
        if start == self.total_items {
            return None;
        }

        let end = start
            + self.base_chunk_size
            + (self.current_chunk_index < self.extra_items) as usize;

        self.current_chunk_index += 1;
        self.current_position = end;

        Some(start..end)
    }
}

/// Splits `[0, n)` into `team` blocks of `n / team` elements, the last block
/// also taking the `n % team` leftover elements.
///
/// When `team > n` every block but the last is empty.
pub fn even_split(n: usize, team: NonZeroUsize) -> Vec<Range<usize>> {
    let team = team.get();
    let block = n / team;
    (0..team)
        .map(|member| {
            let start = member * block;
            let end = if member == team - 1 { n } else { start + block };
            start..end
        })
        .collect()
}

/// Splits `[0, n)` into at most `team` balanced blocks, sizes differing by at
/// most one.
pub fn static_split(n: usize, team: NonZeroUsize) -> Vec<Range<usize>> {
    BalancedSplitter::new(n, team).collect()
}

/// Shared cursor dispensing fixed-size groups of consecutive indices.
#[derive(Debug)]
pub struct ChunkQueue {
    cursor: AtomicUsize,
    n: usize,
    chunk: usize,
}

impl ChunkQueue {
    pub fn new(n: usize, chunk: ChunkSize) -> Self {
        ChunkQueue {
            cursor: AtomicUsize::new(0),
            n,
            chunk: chunk.get(),
        }
    }

    /// Claims the next group. The final group is cut short at `n`.
    pub fn claim(&self) -> Option<Range<usize>> {
        let (n, chunk) = (self.n, self.chunk);
        self.cursor
            .fetch_update(SeqCst, SeqCst, |start| {
                (start < n).then(|| start.saturating_add(chunk).min(n))
            })
            .ok()
            .map(|start| start..start.saturating_add(chunk).min(n))
    }
}

/// Shared cursor whose claims shrink with the work left: each claim takes
/// `ceil(remaining / team)` indices, never fewer than `min_chunk`.
#[derive(Debug)]
pub struct GuidedQueue {
    cursor: AtomicUsize,
    n: usize,
    team: usize,
    min_chunk: usize,
}

impl GuidedQueue {
    pub fn new(n: usize, team: NonZeroUsize, min_chunk: ChunkSize) -> Self {
        GuidedQueue {
            cursor: AtomicUsize::new(0),
            n,
            team: team.get(),
            min_chunk: min_chunk.get(),
        }
    }

    fn claim_len(&self, start: usize) -> usize {
        let remaining = self.n - start;
        remaining
            .div_ceil(self.team)
            .max(self.min_chunk)
            .min(remaining)
    }

    /// Claims the next group, sized from the indices still unclaimed.
    pub fn claim(&self) -> Option<Range<usize>> {
        let n = self.n;
        let mut start = self.cursor.load(SeqCst);
        loop {
            if start >= n {
                return None;
            }
            let end = start + self.claim_len(start);
            match self
                .cursor
                .compare_exchange_weak(start, end, SeqCst, SeqCst)
            {
                Ok(_) => return Some(start..end),
                Err(observed) => start = observed,
            }
        }
    }
}

/// How one policy invocation hands `[0, n)` to its team. Built fresh for
/// every call.
#[derive(Debug)]
pub enum WorkSource {
    /// One precomputed range per member; members past the end get nothing.
    Blocks(Vec<Range<usize>>),
    /// Fixed-size claims from a shared cursor.
    Dynamic(ChunkQueue),
    /// Shrinking claims from a shared cursor.
    Guided(GuidedQueue),
    /// Hands out no work at all.
    Idle,
}

impl WorkSource {
    /// The ranges `member` processes, in claim order. For queue sources the
    /// claims happen lazily, as the iterator is advanced.
    pub fn claims(&self, member: usize) -> Claims<'_> {
        Claims {
            source: self,
            member,
            done: false,
        }
    }
}

/// Iterator over the ranges one team member claims from a [`WorkSource`].
pub struct Claims<'a> {
    source: &'a WorkSource,
    member: usize,
    done: bool,
}

impl Iterator for Claims<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let claim = match self.source {
            WorkSource::Blocks(blocks) => {
                self.done = true;
                blocks.get(self.member).cloned()
            }
            WorkSource::Dynamic(queue) => queue.claim(),
            WorkSource::Guided(queue) => queue.claim(),
            WorkSource::Idle => None,
        };
        if claim.is_none() {
            self.done = true;
        }
        claim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn team(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap()
    }

    /// Verify that all indices from 0 to n-1 are covered exactly once.
    fn covers_exactly_once(n: usize, ranges: &[Range<usize>]) -> bool {
        let mut seen = vec![false; n];
        for range in ranges {
            for idx in range.clone() {
                if idx >= n || seen[idx] {
                    return false;
                }
                seen[idx] = true;
            }
        }
        seen.iter().all(|&b| b)
    }

    fn drain(source: &WorkSource, members: usize) -> Vec<Range<usize>> {
        (0..members).flat_map(|m| source.claims(m)).collect()
    }

    #[test]
    fn test_even_split_remainder_goes_last() {
        let blocks = even_split(10, team(3));
        assert_eq!(blocks, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_even_split_more_members_than_items() {
        let blocks = even_split(3, team(5));
        assert_eq!(blocks, vec![0..0, 0..0, 0..0, 0..0, 0..3]);
        assert!(covers_exactly_once(3, &blocks));
    }

    #[test]
    fn test_static_split_extra_goes_first() {
        let blocks = static_split(10, team(4));
        assert_eq!(blocks, vec![0..3, 3..6, 6..8, 8..10]);
    }

    #[test]
    fn test_static_split_stops_when_items_run_out() {
        assert_eq!(static_split(2, team(5)), vec![0..1, 1..2]);
        assert!(static_split(0, team(3)).is_empty());
    }

    #[test]
    fn test_chunk_queue_final_group_clamped() {
        let queue = ChunkQueue::new(25, ChunkSize::new(10).unwrap());
        assert_eq!(queue.claim(), Some(0..10));
        assert_eq!(queue.claim(), Some(10..20));
        assert_eq!(queue.claim(), Some(20..25));
        assert_eq!(queue.claim(), None);
        assert_eq!(queue.claim(), None);
    }

    #[test]
    fn test_chunk_queue_huge_chunk() {
        let queue = ChunkQueue::new(7, ChunkSize::new(usize::MAX).unwrap());
        assert_eq!(queue.claim(), Some(0..7));
        assert_eq!(queue.claim(), None);
    }

    #[test]
    fn test_guided_first_claim_and_decay() {
        let queue = GuidedQueue::new(100, team(4), ChunkSize::ONE);
        let sizes: Vec<usize> =
            std::iter::from_fn(|| queue.claim()).map(|r| r.len()).collect();

        assert_eq!(sizes[0], 25);
        assert_eq!(sizes[1], 19);
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "{sizes:?}");
        assert_eq!(sizes.iter().sum::<usize>(), 100);
        assert_eq!(*sizes.last().unwrap(), 1);
    }

    #[test]
    fn test_guided_respects_min_chunk() {
        let queue = GuidedQueue::new(50, team(8), ChunkSize::new(4).unwrap());
        let sizes: Vec<usize> =
            std::iter::from_fn(|| queue.claim()).map(|r| r.len()).collect();
        let (tail, body) = sizes.split_last().unwrap();
        assert!(body.iter().all(|&s| s >= 4), "{sizes:?}");
        assert!(*tail <= 4);
    }

    #[test]
    fn test_chunk_size_zero_rejected() {
        assert_eq!(ChunkSize::new(0), Err(ConfigError::ZeroChunkSize));
        assert_eq!(ChunkSize::new(10).unwrap().get(), 10);
    }

    #[test]
    fn test_idle_source_hands_out_nothing() {
        assert_eq!(WorkSource::Idle.claims(0).count(), 0);
    }

    #[test]
    fn test_block_claims_yield_once() {
        let source = WorkSource::Blocks(even_split(9, team(3)));
        let claims: Vec<_> = source.claims(1).collect();
        assert_eq!(claims, vec![3..6]);
        assert_eq!(source.claims(7).count(), 0);
    }

    proptest! {
        #[test]
        fn prop_even_split_complete(n in 0usize..400, members in 1usize..48) {
            let blocks = even_split(n, team(members));
            prop_assert_eq!(blocks.len(), members);
            prop_assert!(covers_exactly_once(n, &blocks));
        }

        #[test]
        fn prop_static_split_complete(n in 0usize..400, members in 1usize..48) {
            let blocks = static_split(n, team(members));
            prop_assert!(blocks.len() <= members);
            prop_assert!(covers_exactly_once(n, &blocks));
            let lens: Vec<usize> = blocks.iter().map(|r| r.len()).collect();
            if let (Some(max), Some(min)) = (lens.iter().max(), lens.iter().min()) {
                prop_assert!(max - min <= 1);
            }
        }

        #[test]
        fn prop_queues_complete(n in 0usize..400, members in 1usize..16, chunk in 1usize..32) {
            let dynamic = WorkSource::Dynamic(ChunkQueue::new(n, ChunkSize::new(chunk).unwrap()));
            prop_assert!(covers_exactly_once(n, &drain(&dynamic, members)));

            let guided = WorkSource::Guided(GuidedQueue::new(n, team(members), ChunkSize::ONE));
            prop_assert!(covers_exactly_once(n, &drain(&guided, members)));
        }
    }
}
