use std::path::Path;
use std::process::{Command, Output};

/// Helper to get the path to a suite fixture.
fn suite_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../suites")
        .join(name)
}

/// Helper to get the nfp binary path.
fn nfp_bin() -> std::path::PathBuf {
    let mut path = std::path::PathBuf::from(env!("CARGO_BIN_EXE_nfp"));
    // Fallback for test environments
    if !path.exists() {
        path = std::path::PathBuf::from("target/debug/nfp");
    }
    path
}

fn nfp(args: &[&str]) -> Output {
    Command::new(nfp_bin())
        .args(args)
        .output()
        .expect("failed to run nfp")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ================================================================
// codec commands
// ================================================================

mod codec {
    use super::{nfp, stdout};

    #[test]
    fn encode_bf16_truncates() {
        let out = nfp(&["encode", "1.5"]);
        assert!(out.status.success());
        assert!(stdout(&out).starts_with("bf16 0x3FC0"));
    }

    #[test]
    fn encode_negative_value() {
        let out = nfp(&["encode", "-2.0", "--type", "half"]);
        assert!(out.status.success());
        assert!(stdout(&out).starts_with("half 0xC000"));
    }

    #[test]
    fn decode_half_hex() {
        let out = nfp(&["decode", "0x3C00", "-t", "half"]);
        assert!(out.status.success());
        assert_eq!(stdout(&out).trim(), "1");
    }

    #[test]
    fn decode_rejects_wide_pattern() {
        let out = nfp(&["decode", "0x10000"]);
        assert!(!out.status.success());
    }

    #[test]
    fn pack_puts_first_value_in_low_lane() {
        let out = nfp(&["pack", "1.0", "2.0"]);
        assert!(out.status.success());
        assert_eq!(stdout(&out).trim(), "bf16x2 0x40003F80");
    }

    #[test]
    fn unpack_bf16_word() {
        let out = nfp(&["unpack", "0x40003F80"]);
        assert!(out.status.success());
        let text = stdout(&out);
        assert!(text.contains("lane0: 1"));
        assert!(text.contains("lane1: 2"));
    }
}

// ================================================================
// compare command
// ================================================================

mod compare {
    use super::{nfp, stdout};

    #[test]
    fn within_bf16_tolerance() {
        let out = nfp(&["compare", "1.0", "1.005"]);
        assert!(out.status.success());
        assert!(stdout(&out).trim_end().ends_with("equal"));
    }

    #[test]
    fn reports_narrow_ulp_distance() {
        let out = nfp(&["compare", "1.0078125", "1.0"]);
        assert!(out.status.success());
        assert!(stdout(&out).contains("bf16 ulp distance: 1"));
    }

    #[test]
    fn outside_half_tolerance() {
        let out = nfp(&["compare", "1.0", "1.005", "-t", "half"]);
        assert!(!out.status.success());
        assert!(stdout(&out).trim_end().ends_with("differ"));
    }
}

// ================================================================
// validate / run commands
// ================================================================

mod suites {
    use super::{nfp, stdout, suite_path};

    #[test]
    fn validate_shipped_suite() {
        let path = suite_path("bf16-storage-builtins.yaml");
        let out = nfp(&["validate", path.to_str().unwrap()]);
        assert!(out.status.success());
        assert!(stdout(&out).contains("Suite is valid."));
    }

    #[test]
    fn validate_rejects_bad_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "metadata:\n  name: bad\nformat: bf16\nsamples: 40\n").unwrap();
        let out = nfp(&["validate", path.to_str().unwrap()]);
        assert!(!out.status.success());
        assert!(stdout(&out).contains("CFG-001"));
    }

    #[test]
    fn validate_nonexistent_file_fails() {
        let out = nfp(&["validate", "/nonexistent/suite.yaml"]);
        assert!(!out.status.success());
    }

    #[test]
    fn run_builtin_bf16_suite() {
        let out = nfp(&["run"]);
        assert!(out.status.success());
        assert!(stdout(&out).trim_end().ends_with("passed"));
    }

    #[test]
    fn run_suite_file_as_json() {
        let path = suite_path("half-builtins.yaml");
        let out = nfp(&["run", path.to_str().unwrap(), "--format", "json"]);
        assert!(out.status.success());
        let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        assert_eq!(report["suite"], "half-builtins");
        assert_eq!(report["totals"]["mismatches"], 0);
    }

    #[test]
    fn run_rne_subset() {
        let path = suite_path("bf16-rne-subset.yaml");
        let out = nfp(&["run", path.to_str().unwrap()]);
        assert!(out.status.success());
    }
}

// ================================================================
// limits command
// ================================================================

mod limits {
    use super::{nfp, stdout};

    #[test]
    fn within_limits() {
        let out = nfp(&["limits", "--global", "4,64,128", "--local", "1,8,32"]);
        assert!(out.status.success());
        assert!(stdout(&out).contains("work-groups: [4, 8, 4]"));
    }

    #[test]
    fn y_dimension_over_limit() {
        let out = nfp(&["limits", "--global", "65536,1", "--local", "1,1"]);
        assert!(!out.status.success());
        let err = String::from_utf8_lossy(&out.stderr);
        assert!(err.contains("Number of work-groups exceed limit for dimension 1"));
    }

    #[test]
    fn custom_yz_limit() {
        let out = nfp(&["limits", "--global", "32,1", "--local", "1,1", "--max-yz", "16"]);
        assert!(!out.status.success());
    }
}
