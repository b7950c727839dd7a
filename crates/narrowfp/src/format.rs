//! Narrow floating-point format descriptors.
//!
//! Each format carries the constants the comparison rules need: its
//! machine epsilon and its smallest positive normal value.

use serde::{Deserialize, Serialize};

use crate::error::NarrowError;

/// A 16-bit floating-point storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrowFormat {
    /// bfloat16: the upper half of an IEEE single (8 exponent, 7 mantissa bits).
    Bf16,
    /// IEEE binary16 (5 exponent, 10 mantissa bits).
    Half,
}

impl NarrowFormat {
    /// Storage width in bits.
    pub const fn bits(self) -> u32 {
        16
    }

    /// Distance from 1.0 to the next representable value.
    pub const fn epsilon(self) -> f32 {
        match self {
            Self::Bf16 => 0.003_906_25,
            Self::Half => 0.000_976_562_5,
        }
    }

    /// Smallest positive normal value.
    pub const fn min_normal(self) -> f32 {
        match self {
            Self::Bf16 => f32::MIN_POSITIVE,
            Self::Half => 6.103_515_625e-5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bf16 => "bf16",
            Self::Half => "half",
        }
    }

    /// Whether a bit pattern of this format encodes NaN.
    pub const fn is_nan_bits(self, bits: u16) -> bool {
        let magnitude = bits & 0x7FFF;
        match self {
            Self::Bf16 => magnitude > 0x7F80,
            Self::Half => magnitude > 0x7C00,
        }
    }

    /// Whether the format has a packed two-lane builtin path.
    pub const fn has_packed_path(self) -> bool {
        matches!(self, Self::Bf16)
    }
}

impl std::fmt::Display for NarrowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NarrowFormat {
    type Err = NarrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bf16" | "bfloat16" => Ok(Self::Bf16),
            "half" | "f16" | "fp16" => Ok(Self::Half),
            other => Err(NarrowError::Parse(format!(
                "format '{other}' (expected bf16 or half)"
            ))),
        }
    }
}

/// How a wide value is narrowed to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Drop the low mantissa bits (round toward zero).
    #[default]
    Truncate,
    /// IEEE round-to-nearest, ties to even.
    NearestEven,
}

impl std::str::FromStr for Rounding {
    type Err = NarrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truncate" | "rtz" => Ok(Self::Truncate),
            "nearest_even" | "nearest-even" | "rne" => Ok(Self::NearestEven),
            other => Err(NarrowError::Parse(format!(
                "rounding '{other}' (expected truncate or nearest_even)"
            ))),
        }
    }
}
