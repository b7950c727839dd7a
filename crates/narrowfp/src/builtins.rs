//! Math builtins under test and their host references.
//!
//! [`Builtin::reference`] is the wide host computation a device result is
//! compared against. [`Evaluator`] is the seam for the implementation under
//! test; [`EmulatedDevice`] is the bit-exact software model of a device that
//! widens, computes in f32, and narrows again.

use serde::{Deserialize, Serialize};

use crate::error::NarrowError;
use crate::format::Rounding;
use crate::{bf16, f16};

/// A floating-point builtin with a narrow overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    Fabs,
    Fmin,
    Fmax,
    Fma,
}

impl Builtin {
    pub const ALL: [Self; 4] = [Self::Fabs, Self::Fmin, Self::Fmax, Self::Fma];

    /// Number of operands.
    pub const fn arity(self) -> usize {
        match self {
            Self::Fabs => 1,
            Self::Fmin | Self::Fmax => 2,
            Self::Fma => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fabs => "fabs",
            Self::Fmin => "fmin",
            Self::Fmax => "fmax",
            Self::Fma => "fma",
        }
    }

    /// Host f32 result. `args` must hold at least `arity()` values.
    #[inline]
    pub fn reference(self, args: &[f32]) -> f32 {
        match self {
            Self::Fabs => args[0].abs(),
            Self::Fmin => args[0].min(args[1]),
            Self::Fmax => args[0].max(args[1]),
            Self::Fma => args[0].mul_add(args[1], args[2]),
        }
    }

    /// Host f64 result. `args` must hold at least `arity()` values.
    #[inline]
    pub fn reference_f64(self, args: &[f64]) -> f64 {
        match self {
            Self::Fabs => args[0].abs(),
            Self::Fmin => args[0].min(args[1]),
            Self::Fmax => args[0].max(args[1]),
            Self::Fma => args[0].mul_add(args[1], args[2]),
        }
    }

    /// [`Builtin::reference`] with an arity check.
    ///
    /// # Errors
    ///
    /// Returns [`NarrowError::Arity`] if `args.len() != self.arity()`.
    pub fn try_reference(self, args: &[f32]) -> Result<f32, NarrowError> {
        if args.len() != self.arity() {
            return Err(NarrowError::Arity {
                builtin: self.name().to_string(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        Ok(self.reference(args))
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Builtin {
    type Err = NarrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| NarrowError::Parse(format!("builtin '{s}'")))
    }
}

/// An implementation of the narrow builtin overloads.
///
/// Arguments are bit patterns; callers pass exactly `builtin.arity()`
/// operands. Vector overloads default to lane-wise scalar evaluation.
pub trait Evaluator {
    /// Human-readable name used in reports.
    fn name(&self) -> &str;

    /// Scalar bf16 overload.
    fn eval_bf16(&self, builtin: Builtin, args: &[u16]) -> u16;

    /// Packed two-lane bf16 overload.
    fn eval_bf16x2(&self, builtin: Builtin, args: &[u32]) -> u32;

    /// Scalar half overload.
    fn eval_half(&self, builtin: Builtin, args: &[u16]) -> u16;

    /// Vector bf16 overload. `args[k]` is the k-th operand vector; every
    /// operand and `out` share the same lane count.
    fn eval_bf16_vec(&self, builtin: Builtin, args: &[&[u16]], out: &mut [u16]) {
        let mut lane_args = [0u16; 3];
        for (lane, slot) in out.iter_mut().enumerate() {
            for (k, operand) in args.iter().enumerate() {
                lane_args[k] = operand[lane];
            }
            *slot = self.eval_bf16(builtin, &lane_args[..args.len()]);
        }
    }

    /// Vector packed bf16 overload.
    fn eval_bf16x2_vec(&self, builtin: Builtin, args: &[&[u32]], out: &mut [u32]) {
        let mut lane_args = [0u32; 3];
        for (lane, slot) in out.iter_mut().enumerate() {
            for (k, operand) in args.iter().enumerate() {
                lane_args[k] = operand[lane];
            }
            *slot = self.eval_bf16x2(builtin, &lane_args[..args.len()]);
        }
    }

    /// Vector half overload.
    fn eval_half_vec(&self, builtin: Builtin, args: &[&[u16]], out: &mut [u16]) {
        let mut lane_args = [0u16; 3];
        for (lane, slot) in out.iter_mut().enumerate() {
            for (k, operand) in args.iter().enumerate() {
                lane_args[k] = operand[lane];
            }
            *slot = self.eval_half(builtin, &lane_args[..args.len()]);
        }
    }
}

/// Software model of a device: widen, compute in f32, narrow.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatedDevice {
    /// Rounding applied to bf16 results. Half results always round to
    /// nearest-even, as device `half` arithmetic does.
    pub rounding: Rounding,
}

impl EmulatedDevice {
    pub const fn new(rounding: Rounding) -> Self {
        Self { rounding }
    }
}

impl Evaluator for EmulatedDevice {
    fn name(&self) -> &str {
        match self.rounding {
            Rounding::Truncate => "emulated(truncate)",
            Rounding::NearestEven => "emulated(nearest_even)",
        }
    }

    fn eval_bf16(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let mut wide = [0.0f32; 3];
        for (w, &bits) in wide.iter_mut().zip(args) {
            *w = bf16::narrow_decode(bits);
        }
        bf16::encode_with(builtin.reference(&wide[..args.len()]), self.rounding)
    }

    fn eval_bf16x2(&self, builtin: Builtin, args: &[u32]) -> u32 {
        let mut lo = [0u16; 3];
        let mut hi = [0u16; 3];
        for (k, &word) in args.iter().enumerate() {
            (lo[k], hi[k]) = bf16::unpack_bits(word);
        }
        let n = args.len();
        bf16::pack_bits(
            self.eval_bf16(builtin, &lo[..n]),
            self.eval_bf16(builtin, &hi[..n]),
        )
    }

    fn eval_half(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let mut wide = [0.0f32; 3];
        for (w, &bits) in wide.iter_mut().zip(args) {
            *w = f16::f16_to_f32(bits);
        }
        f16::f32_to_f16_rne(builtin.reference(&wide[..args.len()]))
    }
}
