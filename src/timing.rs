// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

/// A value together with the wall-clock time it took to produce.
#[derive(Debug, Clone, Copy)]
pub struct Measured<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Measured<T> {
    /// Elapsed time in nanoseconds.
    pub fn elapsed_ns(&self) -> u128 {
        self.elapsed.as_nanos()
    }
}

/// Runs `f` once between two readings of the monotonic clock.
pub fn measure<T, F>(f: F) -> Measured<T>
where
    F: FnOnce() -> T,
{
    let start_time = Instant::now();
    let value = f();
    let elapsed = start_time.elapsed();
    Measured { value, elapsed }
}
