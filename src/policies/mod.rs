// SPDX-License-Identifier: MIT

//! Work-distribution policies for the geometric-mean reduction.
//!
//! Every policy is one fork-join phase on a [`StandardPool`]: a fresh
//! [`WorkSource`] and [`Accumulator`] are built, each team member sums the
//! ranges it claims into a local partial, merges that partial into the
//! accumulator with one atomic add, and the result is read once the team has
//! rejoined.

pub mod even_split;
pub mod schedule;
pub mod task_queue;

use crate::partition::{ChunkSize, WorkSource};
use crate::pools::standardpool::StandardPool;
use crate::reduction::{Accumulator, Scale};
use std::sync::Arc;

pub use schedule::ScheduleKind;

/// Selects one of the work-distribution policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// One contiguous block per worker, remainder to the last one.
    EvenSplit,
    /// Workers claim single indices on demand.
    TaskQueue,
    /// Workers claim groups of consecutive indices on demand.
    ChunkedTaskQueue(ChunkSize),
    /// One of the named loop schedules.
    Scheduled(ScheduleKind),
}

/// Computes the geometric mean of `buffer` on `pool` using `policy`.
pub fn reduce(pool: &StandardPool, buffer: &Arc<[u8]>, policy: Policy) -> f64 {
    match policy {
        Policy::EvenSplit => even_split::even_split(pool, buffer),
        Policy::TaskQueue => task_queue::task_queue(pool, buffer),
        Policy::ChunkedTaskQueue(chunk) => {
            task_queue::task_queue_chunked(pool, buffer, chunk)
        }
        Policy::Scheduled(kind) => schedule::scheduled(pool, buffer, kind),
    }
}

/// Runs one fork-join phase over `source` and finishes the merged sum with
/// `scale`.
pub(crate) fn reduce_with(
    pool: &StandardPool,
    buffer: &Arc<[u8]>,
    source: WorkSource,
    scale: Scale,
) -> f64 {
    let n = buffer.len();
    let accumulator = Arc::new(Accumulator::new());

    let data = buffer.clone();
    let source = Arc::new(source);
    let sink = accumulator.clone();
    pool.run_team(move |member| {
        let partial: f64 = source
            .claims(member)
            .map(|range| scale.partial(&data[range], n))
            .sum();
        sink.add(partial);
    });

    scale.finish(accumulator.value(), n)
}
