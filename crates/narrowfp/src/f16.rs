//! Half-precision (IEEE binary16) bit codec.
//!
//! Widening is exact for every pattern. Two narrowing paths exist:
//! [`f32_to_f16_truncate`] drops mantissa bits the way a storage-only
//! conversion does, and [`f32_to_f16_rne`] rounds to nearest-even, which is
//! what arithmetic on a device `half` type produces.

use crate::format::Rounding;

// ────────────────────────────────────────────────────────────────────────────
// Scalar codec
// ────────────────────────────────────────────────────────────────────────────

/// Convert a half-precision bit pattern to f32.
///
/// Normal values use the bias trick:
/// `f32_bits = (sign << 31) | ((exp + 112) << 23) | (mant << 13)`.
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = u32::from((bits >> 15) & 1);
    let exp = u32::from((bits >> 10) & 0x1F);
    let mant = u32::from(bits & 0x3FF);

    if exp == 0 {
        if mant == 0 {
            return f32::from_bits(sign << 31);
        }
        // Subnormal: mant * 2^-24, exact in f32
        let sign_f = if sign == 1 { -1.0f32 } else { 1.0f32 };
        return sign_f * (mant as f32) * (2.0f32).powi(-24);
    }

    if exp == 31 {
        return f32::from_bits((sign << 31) | 0x7F80_0000 | (mant << 13));
    }

    f32::from_bits((sign << 31) | ((exp + 112) << 23) | (mant << 13))
}

/// Convert an f32 to half by truncating the mantissa.
///
/// Values below the half normal range flush to signed zero and values above
/// it saturate to signed infinity. NaN stays NaN.
#[inline]
pub fn f32_to_f16_truncate(val: f32) -> u16 {
    let bits = val.to_bits();
    let sign = ((bits >> 31) & 1) as u16;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mant = bits & 0x007F_FFFF;

    if exp == 0 {
        return sign << 15;
    }

    if exp == 0xFF {
        if mant == 0 {
            return (sign << 15) | 0x7C00;
        }
        return (sign << 15) | 0x7C00 | ((mant >> 13) as u16 & 0x3FF).max(1);
    }

    // Rebias exponent (f32 bias 127 -> f16 bias 15)
    let f16_exp = exp - 112;
    if f16_exp <= 0 {
        return sign << 15;
    }
    if f16_exp >= 31 {
        return (sign << 15) | 0x7C00;
    }

    let f16_mant = (mant >> 13) as u16;
    (sign << 15) | ((f16_exp as u16) << 10) | f16_mant
}

/// Convert an f32 to half with IEEE round-to-nearest-even.
#[inline]
pub fn f32_to_f16_rne(val: f32) -> u16 {
    half::f16::from_f32(val).to_bits()
}

/// Narrow with an explicit rounding mode.
#[inline]
pub fn encode_with(val: f32, rounding: Rounding) -> u16 {
    match rounding {
        Rounding::Truncate => f32_to_f16_truncate(val),
        Rounding::NearestEven => f32_to_f16_rne(val),
    }
}

/// Value `val` takes after an RNE round trip through half.
#[inline]
pub fn quantize(val: f32) -> f32 {
    f16_to_f32(f32_to_f16_rne(val))
}

// ────────────────────────────────────────────────────────────────────────────
// Packed two-lane codec
// ────────────────────────────────────────────────────────────────────────────

/// Encode two values into one word, `x` in the low lane.
#[inline]
pub fn encode_pair(x: f32, y: f32, rounding: Rounding) -> u32 {
    u32::from(encode_with(x, rounding)) | (u32::from(encode_with(y, rounding)) << 16)
}

/// Decode a two-lane word into `(lane0, lane1)`.
#[inline]
pub fn decode_pair(word: u32) -> (f32, f32) {
    (f16_to_f32(word as u16), f16_to_f32((word >> 16) as u16))
}

// ────────────────────────────────────────────────────────────────────────────
// Batch forms
// ────────────────────────────────────────────────────────────────────────────

/// Batch convert half bit patterns to f32.
///
/// # Panics
/// Panics if `input.len() != output.len()`.
pub fn decode_slice(input: &[u16], output: &mut [f32]) {
    assert_eq!(input.len(), output.len(), "dimension mismatch");
    for (bits, out) in input.iter().zip(output.iter_mut()) {
        *out = f16_to_f32(*bits);
    }
}

/// Batch convert f32 to half bit patterns.
///
/// # Panics
/// Panics if `input.len() != output.len()`.
pub fn encode_slice(input: &[f32], output: &mut [u16], rounding: Rounding) {
    assert_eq!(input.len(), output.len(), "dimension mismatch");
    for (val, out) in input.iter().zip(output.iter_mut()) {
        *out = encode_with(*val, rounding);
    }
}
