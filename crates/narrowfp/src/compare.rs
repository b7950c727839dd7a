//! Approximate equality for narrow-precision results.
//!
//! Device results are checked against a wide host reference with a relative
//! error rule scaled by the format epsilon. The bf16 rule flags a mismatch
//! only when the relative difference *exceeds* `2 * eps`, so 0/0 and NaN
//! comparisons pass. The half rule requires the relative difference to be
//! strictly below `eps`, but treats anything under the half minimum normal
//! as equal.
//!
//! Narrow ULP helpers measure bit-level distance between two device
//! patterns of the same format.

use serde::{Deserialize, Serialize};

use crate::format::NarrowFormat;

/// Relative difference `|2(a - b) / (a + b)|`.
///
/// NaN when `a + b == 0` and `a == b`; infinite when `a == -b != 0`.
#[inline]
pub fn relative_error(a: f32, b: f32) -> f32 {
    (2.0 * (a - b) / (a + b)).abs()
}

/// `true` unless the relative difference of `a` and `b` exceeds `2 * eps`.
#[inline]
pub fn approx_equal(a: f32, b: f32, eps: f32) -> bool {
    !(relative_error(a, b) > eps * 2.0)
}

/// Half-precision rule: strictly inside `eps`, or `|a|` below the half
/// minimum normal.
#[inline]
pub fn half_close(a: f32, b: f32) -> bool {
    relative_error(a, b) < NarrowFormat::Half.epsilon()
        || a.abs() < NarrowFormat::Half.min_normal()
}

/// A comparison rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative epsilon.
    pub eps: f32,
    /// Device values with magnitude below this compare equal.
    #[serde(default)]
    pub flush_below: Option<f32>,
    /// Use the strict `< eps` form instead of `!(> 2 * eps)`.
    #[serde(default)]
    pub strict: bool,
}

impl Tolerance {
    /// Default comparison rule for `format`.
    pub const fn for_format(format: NarrowFormat) -> Self {
        match format {
            NarrowFormat::Bf16 => Self {
                eps: NarrowFormat::Bf16.epsilon(),
                flush_below: None,
                strict: false,
            },
            NarrowFormat::Half => Self {
                eps: NarrowFormat::Half.epsilon(),
                flush_below: Some(NarrowFormat::Half.min_normal()),
                strict: true,
            },
        }
    }

    /// Same rule with a different epsilon.
    #[must_use]
    pub const fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Whether device value `actual` is close enough to `expected`.
    pub fn check(&self, actual: f32, expected: f32) -> bool {
        // bit-identical, including matching infinities
        if actual.to_bits() == expected.to_bits() {
            return true;
        }
        if let Some(floor) = self.flush_below
            && actual.abs() < floor
        {
            return true;
        }
        if self.strict {
            relative_error(actual, expected) < self.eps
        } else {
            approx_equal(actual, expected, self.eps)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Narrow ULP distance
// ────────────────────────────────────────────────────────────────────────────

/// Position of a sign-magnitude pattern on the monotone integer line, with
/// both zeros at the same point.
const fn ordered(bits: u16) -> i32 {
    let magnitude = (bits & 0x7FFF) as i32;
    if bits & 0x8000 == 0 { magnitude } else { -magnitude }
}

/// Steps between two `format` bit patterns along the representable values.
///
/// `+0` and `-0` are the same point, so a sign change costs the two
/// magnitudes added together. NaN on either side gives `u32::MAX`.
#[must_use]
pub fn narrow_ulp_distance(format: NarrowFormat, a: u16, b: u16) -> u32 {
    if format.is_nan_bits(a) || format.is_nan_bits(b) {
        return u32::MAX;
    }
    ordered(a).abs_diff(ordered(b))
}

/// Assert each `actual` pattern is within `max_ulp` steps of `expected`.
///
/// # Panics
///
/// Panics on a length mismatch or on the first lane past `max_ulp`.
pub fn assert_narrow_ulps(format: NarrowFormat, actual: &[u16], expected: &[u16], max_ulp: u32) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{format} lane count mismatch: {} vs {}",
        actual.len(),
        expected.len()
    );
    for (i, (&got, &want)) in actual.iter().zip(expected).enumerate() {
        let dist = narrow_ulp_distance(format, got, want);
        assert!(
            dist <= max_ulp,
            "{format} lane {i}: 0x{got:04X} vs 0x{want:04X} is {dist} ulp(s) apart, max {max_ulp}"
        );
    }
}
