use std::collections::HashSet;

use crate::config::types::{MAX_SAMPLES, SuiteConfig};
use crate::error::{Severity, Violation};

/// Validate a parsed suite for consistency.
///
/// Returns a list of violations. If any violation has
/// [`Severity::Error`], the suite cannot be run.
pub fn validate_config(config: &SuiteConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    validate_samples(config, &mut violations);
    validate_selection(config, &mut violations);
    validate_packed(config, &mut violations);
    validate_tolerance(config, &mut violations);

    violations
}

fn validate_samples(config: &SuiteConfig, violations: &mut Vec<Violation>) {
    if config.samples == 0 || config.samples % 16 != 0 || config.samples > MAX_SAMPLES {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "CFG-001".to_string(),
            message: format!(
                "samples must be a positive multiple of 16 no larger than {MAX_SAMPLES}, got {}",
                config.samples
            ),
            location: Some("samples".to_string()),
        });
    }
}

fn validate_selection(config: &SuiteConfig, violations: &mut Vec<Violation>) {
    if config.builtins.is_empty() {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "CFG-002".to_string(),
            message: "builtins must name at least one builtin".to_string(),
            location: Some("builtins".to_string()),
        });
    }
    if config.widths.is_empty() {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "CFG-003".to_string(),
            message: "widths must name at least one vector width".to_string(),
            location: Some("widths".to_string()),
        });
    }

    let mut seen = HashSet::new();
    for b in &config.builtins {
        if !seen.insert(*b) {
            violations.push(Violation {
                severity: Severity::Warning,
                rule: "CFG-006".to_string(),
                message: format!("Duplicate builtin: {b}"),
                location: Some("builtins".to_string()),
            });
        }
    }
    let mut seen = HashSet::new();
    for w in &config.widths {
        if !seen.insert(*w) {
            violations.push(Violation {
                severity: Severity::Warning,
                rule: "CFG-006".to_string(),
                message: format!("Duplicate width: {w}"),
                location: Some("widths".to_string()),
            });
        }
    }
}

fn validate_packed(config: &SuiteConfig, violations: &mut Vec<Violation>) {
    if config.packed && !config.format.has_packed_path() {
        violations.push(Violation {
            severity: Severity::Warning,
            rule: "CFG-004".to_string(),
            message: format!(
                "packed: true is ignored for format {}",
                config.format
            ),
            location: Some("packed".to_string()),
        });
    }
}

fn validate_tolerance(config: &SuiteConfig, violations: &mut Vec<Violation>) {
    let t = config.tolerance();
    if !t.eps.is_finite() || t.eps <= 0.0 {
        violations.push(Violation {
            severity: Severity::Error,
            rule: "CFG-005".to_string(),
            message: format!("tolerance.eps must be finite and positive, got {}", t.eps),
            location: Some("tolerance.eps".to_string()),
        });
    }
}
