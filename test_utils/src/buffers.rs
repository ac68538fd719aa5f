// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Seeded buffer of bytes in `1..=255`.
pub fn positive_bytes(len: usize, seed: u64) -> Arc<[u8]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(1..=255u8)).collect()
}

/// Seeded buffer over the full byte range, with roughly `zero_ratio` of the
/// bytes forced to zero.
pub fn mixed_bytes(len: usize, zero_ratio: f64, seed: u64) -> Arc<[u8]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.gen_bool(zero_ratio) {
                0
            } else {
                rng.gen_range(1..=255u8)
            }
        })
        .collect()
}

/// `exp(Σ ln b / n)` over the positive bytes, evaluated in a single pass.
pub fn expected_mean(buffer: &[u8]) -> f64 {
    let log_sum: f64 = buffer
        .iter()
        .filter(|&&b| b > 0)
        .map(|&b| f64::from(b).ln())
        .sum();
    (log_sum / buffer.len() as f64).exp()
}
