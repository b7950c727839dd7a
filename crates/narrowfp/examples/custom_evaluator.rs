//! Run a conformance suite against a user-supplied evaluator.
//!
//! The evaluator here widens to f64, computes, and narrows with
//! round-to-nearest-even, standing in for a device whose builtins carry
//! extra internal precision.
//!
//! Usage:
//!   cargo run --example custom_evaluator -- suites/bf16-storage-builtins.yaml

use std::path::PathBuf;
use std::process;

use narrowfp::builtins::{Builtin, Evaluator};
use narrowfp::config::{SuiteConfig, parse_config};
use narrowfp::suite::{format_text, run_suite};
use narrowfp::{NarrowFormat, bf16, f16};

struct WideDevice;

impl WideDevice {
    fn compute(builtin: Builtin, args: &[f32]) -> f32 {
        let mut wide = [0.0f64; 3];
        for (w, &a) in wide.iter_mut().zip(args) {
            *w = f64::from(a);
        }
        builtin.reference_f64(&wide[..args.len()]) as f32
    }
}

impl Evaluator for WideDevice {
    fn name(&self) -> &str {
        "wide-f64"
    }

    fn eval_bf16(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let wide: Vec<f32> = args.iter().map(|&b| bf16::narrow_decode(b)).collect();
        bf16::narrow_encode_rne(Self::compute(builtin, &wide))
    }

    fn eval_bf16x2(&self, builtin: Builtin, args: &[u32]) -> u32 {
        let (lo, hi): (Vec<f32>, Vec<f32>) =
            args.iter().map(|&w| bf16::narrow_decode_pair(w)).unzip();
        bf16::pack_bits(
            bf16::narrow_encode_rne(Self::compute(builtin, &lo)),
            bf16::narrow_encode_rne(Self::compute(builtin, &hi)),
        )
    }

    fn eval_half(&self, builtin: Builtin, args: &[u16]) -> u16 {
        let wide: Vec<f32> = args.iter().map(|&b| f16::f16_to_f32(b)).collect();
        f16::f32_to_f16_rne(Self::compute(builtin, &wide))
    }
}

fn main() {
    let config = std::env::args().nth(1).map_or_else(
        || SuiteConfig::default_for(NarrowFormat::Bf16),
        |arg| {
            let path = PathBuf::from(arg);
            parse_config(&path).unwrap_or_else(|e| {
                eprintln!("Failed to parse {}: {e}", path.display());
                process::exit(1);
            })
        },
    );

    let report = run_suite(&config, &WideDevice).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    print!("{}", format_text(&report));

    if !report.passed() {
        process::exit(1);
    }
}
