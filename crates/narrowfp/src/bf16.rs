//! bfloat16 bit-level emulation.
//!
//! bf16 is the upper 16 bits of an IEEE 754 single:
//!
//! ```text
//! f32:  SEEEEEEE EMMMMMMM MMMMMMMM MMMMMMMM
//! bf16: SEEEEEEE EMMMMMMM
//! ```
//!
//! The storage builtins being validated narrow by truncation, so
//! [`narrow_encode`] drops the low half without rounding. Decoding is exact.
//!
//! Packed words hold two lanes: lane 0 in bits 0..16, lane 1 in bits 16..32.

use crate::format::Rounding;

// ────────────────────────────────────────────────────────────────────────────
// Scalar codec
// ────────────────────────────────────────────────────────────────────────────

/// Narrow an f32 to bf16 by keeping the upper 16 bits of its pattern.
#[inline]
pub fn narrow_encode(x: f32) -> u16 {
    (x.to_bits() >> 16) as u16
}

/// Widen a bf16 pattern to f32 by zero-filling the low 16 bits.
#[inline]
pub fn narrow_decode(bits: u16) -> f32 {
    f32::from_bits(u32::from(bits) << 16)
}

/// Narrow an f32 to bf16 with round-to-nearest-even.
///
/// NaN inputs keep their sign and come out as a quiet NaN, since rounding
/// the payload could otherwise carry into the exponent and produce infinity.
#[inline]
pub fn narrow_encode_rne(x: f32) -> u16 {
    let bits = x.to_bits();
    if x.is_nan() {
        return ((bits >> 16) as u16) | 0x0040;
    }
    let lsb = (bits >> 16) & 1;
    let bias = 0x7FFF + lsb;
    (bits.wrapping_add(bias) >> 16) as u16
}

/// Narrow with an explicit rounding mode.
#[inline]
pub fn encode_with(x: f32, rounding: Rounding) -> u16 {
    match rounding {
        Rounding::Truncate => narrow_encode(x),
        Rounding::NearestEven => narrow_encode_rne(x),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Packed two-lane codec
// ────────────────────────────────────────────────────────────────────────────

/// Pack two bf16 patterns into one word, `lo` in the low half.
#[inline]
pub fn pack_bits(lo: u16, hi: u16) -> u32 {
    u32::from(lo) | (u32::from(hi) << 16)
}

/// Split a packed word into `(lo, hi)` lane patterns.
#[inline]
pub fn unpack_bits(word: u32) -> (u16, u16) {
    (word as u16, (word >> 16) as u16)
}

/// Truncate `x` and `y` to bf16 and pack them, `x` in lane 0.
#[inline]
pub fn narrow_encode_pair(x: f32, y: f32) -> u32 {
    pack_bits(narrow_encode(x), narrow_encode(y))
}

/// Unpack a two-lane word into `(lane0, lane1)` as f32.
#[inline]
pub fn narrow_decode_pair(word: u32) -> (f32, f32) {
    let (lo, hi) = unpack_bits(word);
    (narrow_decode(lo), narrow_decode(hi))
}

/// Pack with an explicit rounding mode.
#[inline]
pub fn encode_pair_with(x: f32, y: f32, rounding: Rounding) -> u32 {
    pack_bits(encode_with(x, rounding), encode_with(y, rounding))
}

// ────────────────────────────────────────────────────────────────────────────
// Batch forms
// ────────────────────────────────────────────────────────────────────────────

/// Batch truncate f32 values to bf16 patterns.
///
/// # Panics
/// Panics if `input.len() != output.len()`.
pub fn encode_slice(input: &[f32], output: &mut [u16]) {
    assert_eq!(input.len(), output.len(), "dimension mismatch");
    for (val, out) in input.iter().zip(output.iter_mut()) {
        *out = narrow_encode(*val);
    }
}

/// Batch widen bf16 patterns to f32.
///
/// # Panics
/// Panics if `input.len() != output.len()`.
pub fn decode_slice(input: &[u16], output: &mut [f32]) {
    assert_eq!(input.len(), output.len(), "dimension mismatch");
    for (bits, out) in input.iter().zip(output.iter_mut()) {
        *out = narrow_decode(*bits);
    }
}

/// Value `x` takes after a truncating round trip through bf16.
#[inline]
pub fn quantize(x: f32) -> f32 {
    narrow_decode(narrow_encode(x))
}
