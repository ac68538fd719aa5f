// SPDX-License-Identifier: MIT

//! Batch driver: gathers the input bytes, runs every policy once in a fixed
//! order and renders one report line per policy.

use crate::partition::ChunkSize;
use crate::policies::{self, Policy, ScheduleKind};
use crate::pools::standardpool::StandardPool;
use crate::timing::{self, Measured};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Concatenates the contents of `paths` in order. Files that cannot be read
/// are logged and skipped.
pub fn load_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<u8> {
    let mut buffer = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded input");
                buffer.extend_from_slice(&bytes);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable input");
            }
        }
    }
    buffer
}

/// The policies of a batch run, with their report labels, in run order.
pub fn lineup(chunk: ChunkSize) -> [(&'static str, Policy); 6] {
    [
        ("Even Split Method", Policy::EvenSplit),
        ("Task Queue Method", Policy::TaskQueue),
        ("Task Queue Large Tasks Method", Policy::ChunkedTaskQueue(chunk)),
        ("Static Schedule Method", Policy::Scheduled(ScheduleKind::Static)),
        ("Dynamic Schedule Method", Policy::Scheduled(ScheduleKind::Dynamic)),
        ("Guided Schedule Method", Policy::Scheduled(ScheduleKind::Guided)),
    ]
}

/// Outcome of one timed policy run.
#[derive(Debug, Clone)]
pub struct PolicyReport {
    pub label: &'static str,
    pub result: Measured<f64>,
}

impl fmt::Display for PolicyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (Time: {} ns)",
            self.label,
            format_general(self.result.value),
            self.result.elapsed_ns()
        )
    }
}

/// Runs every policy of [`lineup`] once over `buffer`, timing each run.
pub fn run_all(pool: &StandardPool, buffer: &Arc<[u8]>, chunk: ChunkSize) -> Vec<PolicyReport> {
    lineup(chunk)
        .into_iter()
        .map(|(label, policy)| {
            let result = timing::measure(|| policies::reduce(pool, buffer, policy));
            tracing::debug!(label, elapsed_ns = result.elapsed_ns() as u64, "policy finished");
            PolicyReport { label, result }
        })
        .collect()
}

/// Significant digits shown by [`format_general`].
const SIGNIFICANT_DIGITS: i32 = 6;

/// Formats `value` the way C's `%g` does: six significant digits, trailing
/// zeros removed, scientific notation for exponents below -4 or from 6 up.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the shown precision may carry into the next decade, so the
    // exponent is read back from the rounded scientific form.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return scientific,
    };

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
