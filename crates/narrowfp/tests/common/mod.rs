//! Shared helpers for narrow-float falsification tests.

#![allow(dead_code)]

use narrowfp::builtins::{Builtin, EmulatedDevice, Evaluator};
use narrowfp::bf16;

/// Representative values: negative, positive, zero and near-zero
/// magnitudes, plus values that are not exact in bf16.
pub fn representative_values() -> Vec<f32> {
    vec![
        -1.0e30, -65504.0, -3.0, -1.0, -0.479_166_66, -1.0e-3, -1.0e-30,
        -0.0, 0.0,
        1.0e-30, 1.0e-3, 0.1, 1.0 / 3.0, 1.0, 2.718_281_8, 141.0, 1.0e30,
    ]
}

/// Mutation: adds `ulps` bf16 ulps to every finite non-zero result.
pub struct UlpSkewDevice {
    pub ulps: u16,
}

impl Evaluator for UlpSkewDevice {
    fn name(&self) -> &str {
        "ulp-skew"
    }

    fn eval_bf16(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let bits = EmulatedDevice::default().eval_bf16(builtin, args);
        if bf16::narrow_decode(bits) == 0.0 {
            bits
        } else {
            bits.wrapping_add(self.ulps)
        }
    }

    fn eval_bf16x2(&self, builtin: Builtin, args: &[u32]) -> u32 {
        let mut lo = [0u16; 3];
        let mut hi = [0u16; 3];
        for (k, &w) in args.iter().enumerate() {
            (lo[k], hi[k]) = bf16::unpack_bits(w);
        }
        let n = args.len();
        bf16::pack_bits(self.eval_bf16(builtin, &lo[..n]), self.eval_bf16(builtin, &hi[..n]))
    }

    fn eval_half(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let bits = EmulatedDevice::default().eval_half(builtin, args);
        if bits & 0x7FFF == 0 {
            bits
        } else {
            bits.wrapping_add(self.ulps)
        }
    }
}

/// Mutation: packed overload returns its lanes swapped.
pub struct SwappedLanesDevice;

impl Evaluator for SwappedLanesDevice {
    fn name(&self) -> &str {
        "swapped-lanes"
    }

    fn eval_bf16(&self, builtin: Builtin, args: &[u16]) -> u16 {
        EmulatedDevice::default().eval_bf16(builtin, args)
    }

    fn eval_bf16x2(&self, builtin: Builtin, args: &[u32]) -> u32 {
        EmulatedDevice::default().eval_bf16x2(builtin, args).rotate_left(16)
    }

    fn eval_half(&self, builtin: Builtin, args: &[u16]) -> u16 {
        EmulatedDevice::default().eval_half(builtin, args)
    }
}
