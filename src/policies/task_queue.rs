// SPDX-License-Identifier: MIT

use super::reduce_with;
use crate::partition::{ChunkQueue, ChunkSize, WorkSource};
use crate::pools::standardpool::StandardPool;
use crate::reduction::Scale;
use std::sync::Arc;

/// Idle workers claim one index at a time from a shared cursor. Each
/// logarithm is divided by `n` before it is added.
pub fn task_queue(pool: &StandardPool, buffer: &Arc<[u8]>) -> f64 {
    task_queue_chunked(pool, buffer, ChunkSize::ONE)
}

/// Like [`task_queue`], but every claim takes `chunk` consecutive indices.
pub fn task_queue_chunked(
    pool: &StandardPool,
    buffer: &Arc<[u8]>,
    chunk: ChunkSize,
) -> f64 {
    tracing::debug!(n = buffer.len(), chunk = chunk.get(), "task queue");
    let queue = ChunkQueue::new(buffer.len(), chunk);
    reduce_with(pool, buffer, WorkSource::Dynamic(queue), Scale::MeanSpace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduction::reference_mean;

    #[test]
    fn test_chunk_not_dividing_length() {
        let pool = StandardPool::new(3).unwrap();
        let data: Vec<u8> = (1..=97u8).collect();
        let buffer: Arc<[u8]> = data.into();

        let expected = reference_mean(&buffer);
        for chunk in [1, 7, 10, 96, 97, 1000] {
            let actual =
                task_queue_chunked(&pool, &buffer, ChunkSize::new(chunk).unwrap());
            assert!(
                (actual - expected).abs() / expected < 1e-9,
                "chunk {chunk}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_empty_buffer_is_nan() {
        let pool = StandardPool::new(2).unwrap();
        let buffer: Arc<[u8]> = Vec::<u8>::new().into();
        assert!(task_queue(&pool, &buffer).is_nan());
    }
}
