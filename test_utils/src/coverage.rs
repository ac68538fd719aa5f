// SPDX-License-Identifier: MIT

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering::SeqCst};

/// Counts, from any number of threads, how often each index of `[0, n)` was
/// handed out.
pub struct CoverageRecorder {
    visits: Vec<AtomicU32>,
    out_of_bounds: AtomicU32,
}

impl CoverageRecorder {
    pub fn new(n: usize) -> Self {
        CoverageRecorder {
            visits: (0..n).map(|_| AtomicU32::new(0)).collect(),
            out_of_bounds: AtomicU32::new(0),
        }
    }

    pub fn record(&self, range: Range<usize>) {
        for idx in range {
            match self.visits.get(idx) {
                Some(count) => {
                    count.fetch_add(1, SeqCst);
                }
                None => {
                    self.out_of_bounds.fetch_add(1, SeqCst);
                }
            }
        }
    }

    /// Indices whose visit count is not exactly one, with that count.
    pub fn misses(&self) -> Vec<(usize, u32)> {
        self.visits
            .iter()
            .enumerate()
            .map(|(idx, count)| (idx, count.load(SeqCst)))
            .filter(|&(_, count)| count != 1)
            .collect()
    }

    /// True when every index was visited exactly once and nothing past the
    /// end was handed out.
    pub fn is_exact(&self) -> bool {
        self.out_of_bounds.load(SeqCst) == 0 && self.misses().is_empty()
    }
}
