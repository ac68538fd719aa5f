// SPDX-License-Identifier: MIT

pub mod buffers;
pub mod coverage;

/// Asserts that `actual` is within `rel_tol` relative error of `expected`.
///
/// NaN only matches NaN.
pub fn assert_close(actual: f64, expected: f64, rel_tol: f64, context: &str) {
    if expected.is_nan() {
        assert!(actual.is_nan(), "{context}: expected NaN, got {actual}");
        return;
    }
    let scale = expected.abs().max(f64::MIN_POSITIVE);
    let rel_err = (actual - expected).abs() / scale;
    assert!(
        rel_err <= rel_tol,
        "{context}: {actual} vs {expected} (relative error {rel_err:e})"
    );
}
