// SPDX-License-Identifier: MIT

//! The reduction every policy shares: which bytes contribute, how a
//! contribution is scaled, and how partial results are merged.
//!
//! The result for a buffer `b` of length `n` is
//! `exp((Σ_{i: b[i] > 0} ln b[i]) / n)`. Zero bytes are left out of the sum
//! but still count towards `n`, so an all-zero buffer reduces to `1.0` and an
//! empty one to `NaN`.

use std::sync::atomic::{AtomicU64, Ordering::SeqCst};

/// Log-domain contribution of a single byte, or `None` for an excluded zero.
#[inline]
pub fn contribution(byte: u8) -> Option<f64> {
    (byte > 0).then(|| f64::from(byte).ln())
}

/// Where the division by `n` happens.
///
/// The two scales are algebraically equal but round differently, and each
/// policy keeps the one it has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Sum raw logarithms, divide the total by `n` once at the end.
    LogSum,
    /// Divide every logarithm by `n` before adding it.
    MeanSpace,
}

impl Scale {
    /// Sums the scaled contributions of `block`, which belongs to a buffer of
    /// `n` bytes in total.
    pub fn partial(self, block: &[u8], n: usize) -> f64 {
        let logs = block.iter().copied().filter_map(contribution);
        match self {
            Scale::LogSum => logs.sum(),
            Scale::MeanSpace => {
                let n = n as f64;
                logs.map(|log| log / n).sum()
            }
        }
    }

    /// Turns the merged accumulator into the geometric mean.
    pub fn finish(self, accumulated: f64, n: usize) -> f64 {
        match self {
            Scale::LogSum => (accumulated / n as f64).exp(),
            // Nothing was ever divided, so the 0/0 of an empty buffer has to
            // be surfaced here.
            Scale::MeanSpace if n == 0 => f64::NAN,
            Scale::MeanSpace => accumulated.exp(),
        }
    }
}

/// A shared `f64` sum that any number of threads may add to.
///
/// The value lives as raw bits in an [`AtomicU64`]; every addition is a
/// single compare-and-swap, so no update is ever lost.
#[derive(Debug)]
pub struct Accumulator {
    bits: AtomicU64,
}

impl Accumulator {
    /// A fresh accumulator holding `0.0`.
    pub fn new() -> Self {
        Accumulator {
            bits: AtomicU64::new(0.0f64.to_bits()),
        }
    }

    /// Atomically adds `value` to the running sum.
    pub fn add(&self, value: f64) {
        let mut current = self.bits.load(SeqCst);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, SeqCst, SeqCst)
            {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Current value of the sum.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(SeqCst))
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator::new()
    }
}

/// Single-threaded evaluation of the reduction, used as the yardstick for the
/// parallel policies.
pub fn reference_mean(buffer: &[u8]) -> f64 {
    Scale::LogSum.finish(Scale::LogSum.partial(buffer, buffer.len()), buffer.len())
}
