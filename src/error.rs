// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while assembling a pool or a policy's parameters.
///
/// Reductions themselves never fail; degenerate inputs surface as `NaN`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a worker pool needs at least one thread")]
    ZeroWorkers,

    #[error("chunk size must be greater than 0")]
    ZeroChunkSize,
}
