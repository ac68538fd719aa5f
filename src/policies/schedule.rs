// SPDX-License-Identifier: MIT

use super::reduce_with;
use crate::partition::{self, ChunkQueue, ChunkSize, GuidedQueue, WorkSource};
use crate::pools::standardpool::StandardPool;
use crate::reduction::Scale;
use std::convert::Infallible;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

/// Named loop schedules.
///
/// Parsing never fails: any unknown name becomes [`ScheduleKind::Unrecognized`],
/// which distributes no work and therefore reduces to `exp(0) = 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// One balanced block per worker, fixed up front.
    Static,
    /// Single-index claims from a shared cursor.
    Dynamic,
    /// Claims of `ceil(remaining / team)` indices, shrinking as work runs out.
    Guided,
    Unrecognized,
}

impl FromStr for ScheduleKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "static" => ScheduleKind::Static,
            "dynamic" => ScheduleKind::Dynamic,
            "guided" => ScheduleKind::Guided,
            _ => ScheduleKind::Unrecognized,
        })
    }
}

impl From<&str> for ScheduleKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleKind::Static => "static",
            ScheduleKind::Dynamic => "dynamic",
            ScheduleKind::Guided => "guided",
            ScheduleKind::Unrecognized => "unrecognized",
        })
    }
}

/// Runs the reduction under the named schedule. Contributions are divided by
/// `n` before they are merged.
pub fn scheduled(pool: &StandardPool, buffer: &Arc<[u8]>, kind: ScheduleKind) -> f64 {
    let n = buffer.len();
    let team = NonZeroUsize::new(pool.team_size()).unwrap_or(NonZeroUsize::MIN);

    let source = match kind {
        ScheduleKind::Static => WorkSource::Blocks(partition::static_split(n, team)),
        ScheduleKind::Dynamic => WorkSource::Dynamic(ChunkQueue::new(n, ChunkSize::ONE)),
        ScheduleKind::Guided => {
            WorkSource::Guided(GuidedQueue::new(n, team, ChunkSize::ONE))
        }
        ScheduleKind::Unrecognized => {
            tracing::debug!("unrecognized schedule, nothing is accumulated");
            return 0.0f64.exp();
        }
    };

    tracing::debug!(n, team = team.get(), schedule = %kind, "scheduled loop");
    reduce_with(pool, buffer, source, Scale::MeanSpace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!(ScheduleKind::from("static"), ScheduleKind::Static);
        assert_eq!(ScheduleKind::from("dynamic"), ScheduleKind::Dynamic);
        assert_eq!(ScheduleKind::from("guided"), ScheduleKind::Guided);
        assert_eq!(ScheduleKind::from("Static"), ScheduleKind::Unrecognized);
        assert_eq!(ScheduleKind::from("auto"), ScheduleKind::Unrecognized);
        assert_eq!(ScheduleKind::from(""), ScheduleKind::Unrecognized);
    }

    #[test]
    fn test_display_round_trips_known_kinds() {
        for kind in [ScheduleKind::Static, ScheduleKind::Dynamic, ScheduleKind::Guided] {
            assert_eq!(ScheduleKind::from(kind.to_string().as_str()), kind);
        }
    }

    #[test]
    fn test_unrecognized_is_one() {
        let pool = StandardPool::new(2).unwrap();
        let buffer: Arc<[u8]> = vec![3u8, 9, 27].into();
        assert_eq!(scheduled(&pool, &buffer, ScheduleKind::Unrecognized), 1.0);

        let empty: Arc<[u8]> = Vec::<u8>::new().into();
        assert_eq!(scheduled(&pool, &empty, ScheduleKind::Unrecognized), 1.0);
    }

    #[test]
    fn test_guided_matches_static() {
        let pool = StandardPool::new(5).unwrap();
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 256) as u8).collect();
        let buffer: Arc<[u8]> = data.into();

        let fixed = scheduled(&pool, &buffer, ScheduleKind::Static);
        let guided = scheduled(&pool, &buffer, ScheduleKind::Guided);
        assert!((fixed - guided).abs() / fixed < 1e-9);
    }
}
