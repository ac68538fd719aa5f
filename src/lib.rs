// SPDX-License-Identifier: MIT

//! Geometric mean of a byte buffer computed under several parallel
//! work-distribution policies on a persistent worker pool.
//!
//! ```no_run
//! use geomean_pools::{reduce, Policy, ScheduleKind, StandardPool};
//! use std::sync::Arc;
//!
//! let pool = StandardPool::new(4).unwrap();
//! let buffer: Arc<[u8]> = vec![1u8, 2, 4, 8].into();
//! let mean = reduce(&pool, &buffer, Policy::Scheduled(ScheduleKind::Guided));
//! assert!((mean - 2.828427).abs() < 1e-6);
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod partition;
pub mod policies;
pub mod pools;
pub mod reduction;
pub mod timing;

pub use error::ConfigError;
pub use partition::ChunkSize;
pub use policies::{reduce, Policy, ScheduleKind};
pub use pools::standardpool::{StandardPool, Task};
pub use reduction::reference_mean;
