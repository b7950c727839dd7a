//! Falsification tests for the conformance runner.
//!
//! A correct emulated device must pass the shipped suites, and each
//! mutated device in `common` must be caught.

mod common;

use std::path::{Path, PathBuf};

use narrowfp::builtins::{Builtin, Evaluator};
use narrowfp::compare::assert_narrow_ulps;
use narrowfp::config::{SuiteConfig, parse_config, validate_config};
use narrowfp::error::Severity;
use narrowfp::suite::{CasePath, Samples, run_suite};
use narrowfp::{EmulatedDevice, NarrowError, NarrowFormat, Rounding, bf16};

fn suite_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../suites")
        .join(name)
}

fn load(name: &str) -> SuiteConfig {
    parse_config(&suite_path(name)).unwrap()
}

#[test]
fn shipped_suites_have_no_errors() {
    for name in [
        "bf16-storage-builtins.yaml",
        "half-builtins.yaml",
        "bf16-rne-subset.yaml",
    ] {
        let config = load(name);
        let errors: Vec<_> = validate_config(&config)
            .into_iter()
            .filter(|v| v.severity == Severity::Error)
            .collect();
        assert!(errors.is_empty(), "{name}: {errors:?}");
    }
}

/// FALSIFY-CF-001: A truncating device passes the bf16 storage suite
///
/// Prediction: every scalar, vector and packed case passes at 48 samples.
/// If fails: codec, lane layout or tolerance disagrees with device behavior.
#[test]
fn falsify_cf_001_truncating_device_passes_bf16() {
    let config = load("bf16-storage-builtins.yaml");
    let report = run_suite(&config, &EmulatedDevice::new(Rounding::Truncate)).unwrap();
    assert!(report.passed(), "FALSIFIED CF-001: {:?}", report.totals);
    assert_eq!(report.totals.cases, 4 * 6 * 2);
    assert_eq!(report.totals.mismatches, 0);
}

/// FALSIFY-CF-002: A nearest-even device passes the bf16 storage suite
///
/// Prediction: rounding the result instead of truncating stays in tolerance.
/// If fails: the tolerance is tighter than one bf16 ulp.
#[test]
fn falsify_cf_002_rne_device_passes_bf16() {
    let config = load("bf16-storage-builtins.yaml");
    let report = run_suite(&config, &EmulatedDevice::new(Rounding::NearestEven)).unwrap();
    assert!(report.passed(), "FALSIFIED CF-002: {:?}", report.totals);
}

/// FALSIFY-CF-003: The emulated device matches host half exactly
///
/// Prediction: the half suite passes with zero mismatches.
/// If fails: half narrowing differs from the host half conversion.
#[test]
fn falsify_cf_003_half_suite_passes() {
    let config = load("half-builtins.yaml");
    let report = run_suite(&config, &EmulatedDevice::default()).unwrap();
    assert!(report.passed(), "FALSIFIED CF-003: {:?}", report.totals);
    assert_eq!(report.format, NarrowFormat::Half);
    assert!(report.cases.iter().all(|c| c.path == CasePath::Narrow));
}

/// FALSIFY-CF-004: Swapped packed lanes are detected
///
/// Prediction: every packed case fails, every 16-bit case passes.
/// If fails: the runner does not check each packed lane against its own index.
#[test]
fn falsify_cf_004_swapped_lanes_detected() {
    let config = load("bf16-storage-builtins.yaml");
    let report = run_suite(&config, &common::SwappedLanesDevice).unwrap();
    assert!(!report.passed());
    for case in &report.cases {
        match case.path {
            CasePath::Narrow => assert!(case.passed(), "{} w{}", case.builtin, case.width),
            CasePath::Packed => assert!(
                !case.passed(),
                "FALSIFIED CF-004: {} w{} missed swap",
                case.builtin,
                case.width
            ),
        }
    }
}

/// FALSIFY-CF-005: Results off by several ulps are detected
///
/// Prediction: a device adding 4 ulps to each result fails both suites.
/// If fails: the tolerance is too loose to catch real precision loss.
#[test]
fn falsify_cf_005_ulp_skew_detected() {
    let device = common::UlpSkewDevice { ulps: 4 };
    for name in ["bf16-storage-builtins.yaml", "half-builtins.yaml"] {
        let report = run_suite(&load(name), &device).unwrap();
        assert!(!report.passed(), "FALSIFIED CF-005: {name}");
        assert!(report.totals.mismatches > 0);
    }
}

/// FALSIFY-CF-006: A wider sweep separates truncation from nearest-even
///
/// Prediction: at 256 samples a truncating device fails `fma` while a
/// nearest-even device passes.
/// If fails: the fma reference or the sample pattern changed.
#[test]
fn falsify_cf_006_wide_sweep_needs_rounding() {
    let config = load("bf16-rne-subset.yaml");
    let rne = run_suite(&config, &EmulatedDevice::new(Rounding::NearestEven)).unwrap();
    assert!(rne.passed(), "FALSIFIED CF-006: rne {:?}", rne.totals);
    let truncating = run_suite(&config, &EmulatedDevice::new(Rounding::Truncate)).unwrap();
    assert!(!truncating.passed(), "FALSIFIED CF-006: truncation passed");
}

/// FALSIFY-CF-007: Device rounding modes differ by at most one bf16 ulp
///
/// Prediction: for every builtin and sample, the truncating and nearest-even
/// devices return patterns at most 1 ulp apart.
/// If fails: one device computes in a different precision, not just rounds
/// differently.
#[test]
fn falsify_cf_007_rounding_modes_one_ulp_apart() {
    let samples = Samples::generate(NarrowFormat::Bf16, 256);
    let truncating = EmulatedDevice::new(Rounding::Truncate);
    let nearest = EmulatedDevice::new(Rounding::NearestEven);
    for builtin in Builtin::ALL {
        let arity = builtin.arity();
        let mut got = Vec::with_capacity(samples.len());
        let mut want = Vec::with_capacity(samples.len());
        for i in 0..samples.len() {
            let args: Vec<u16> = samples.args(i)[..arity]
                .iter()
                .map(|&x| bf16::narrow_encode(x))
                .collect();
            got.push(truncating.eval_bf16(builtin, &args));
            want.push(nearest.eval_bf16(builtin, &args));
        }
        assert_narrow_ulps(NarrowFormat::Bf16, &got, &want, 1);
    }
}

#[test]
fn oversized_suite_is_rejected_before_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.yaml");
    std::fs::write(
        &path,
        "metadata:\n  name: huge\nformat: bf16\nsamples: 4611686018427387904\n",
    )
    .unwrap();
    let config = parse_config(&path).unwrap();
    let err = run_suite(&config, &EmulatedDevice::default()).unwrap_err();
    assert!(matches!(err, NarrowError::Config(_)));
}

#[test]
fn invalid_suite_is_rejected_before_running() {
    let mut config = SuiteConfig::default_for(NarrowFormat::Bf16);
    config.samples = 40;
    let err = run_suite(&config, &EmulatedDevice::default()).unwrap_err();
    assert!(matches!(err, NarrowError::Config(_)));
    assert!(err.to_string().contains("CFG-001"));
}

#[test]
fn report_serializes_to_json() {
    let mut config = SuiteConfig::default_for(NarrowFormat::Bf16);
    config.widths.truncate(1);
    let report = run_suite(&config, &EmulatedDevice::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["format"], "bf16");
    assert_eq!(json["totals"]["cases"], 8);
    assert!(json["cases"].as_array().is_some_and(|c| c.len() == 8));
}
