// SPDX-License-Identifier: MIT

use super::reduce_with;
use crate::partition::{self, WorkSource};
use crate::pools::standardpool::StandardPool;
use crate::reduction::Scale;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Splits the buffer into one contiguous block per worker and sums raw
/// logarithms, dividing by `n` only once the team has rejoined.
pub fn even_split(pool: &StandardPool, buffer: &Arc<[u8]>) -> f64 {
    let team = NonZeroUsize::new(pool.team_size()).unwrap_or(NonZeroUsize::MIN);
    let blocks = partition::even_split(buffer.len(), team);
    tracing::debug!(
        n = buffer.len(),
        team = team.get(),
        block = buffer.len() / team.get(),
        "even split"
    );
    reduce_with(pool, buffer, WorkSource::Blocks(blocks), Scale::LogSum)
}
