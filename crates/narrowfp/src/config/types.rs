use serde::{Deserialize, Serialize};

use crate::builtins::Builtin;
use crate::compare::Tolerance;
use crate::format::{NarrowFormat, Rounding};
use crate::vector::VecWidth;

/// Default sample count (divisible by every stride).
pub const DEFAULT_SAMPLES: usize = 48;

/// Largest sample count a suite may request.
pub const MAX_SAMPLES: usize = 1 << 20;

/// A conformance suite definition.
///
/// Every field but `metadata` and `format` has a default: 48 samples,
/// every builtin at every width, and the format's own tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub metadata: SuiteMetadata,
    pub format: NarrowFormat,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default = "default_builtins")]
    pub builtins: Vec<Builtin>,
    #[serde(default = "default_widths")]
    pub widths: Vec<VecWidth>,
    #[serde(default = "default_packed")]
    pub packed: bool,
    #[serde(default)]
    pub tolerance: Option<ToleranceOverride>,
}

/// Suite metadata block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial tolerance; unset fields fall back to the format rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToleranceOverride {
    #[serde(default)]
    pub eps: Option<f32>,
    #[serde(default)]
    pub flush_below: Option<f32>,
    #[serde(default)]
    pub strict: Option<bool>,
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_builtins() -> Vec<Builtin> {
    Builtin::ALL.to_vec()
}

fn default_widths() -> Vec<VecWidth> {
    VecWidth::ALL.to_vec()
}

fn default_packed() -> bool {
    true
}

impl SuiteConfig {
    /// Built-in suite for `format`: every builtin at every width.
    pub fn default_for(format: NarrowFormat) -> Self {
        let (name, description) = match format {
            NarrowFormat::Bf16 => (
                "bf16-storage-builtins",
                "bf16 storage builtins (scalar, vector and packed) against f32",
            ),
            NarrowFormat::Half => (
                "half-builtins",
                "half builtins (scalar and vector) against a host half reference",
            ),
        };
        Self {
            metadata: SuiteMetadata {
                name: name.to_string(),
                description: Some(description.to_string()),
            },
            format,
            samples: DEFAULT_SAMPLES,
            rounding: Rounding::Truncate,
            builtins: default_builtins(),
            widths: default_widths(),
            packed: format.has_packed_path(),
            tolerance: None,
        }
    }

    /// Effective comparison rule.
    pub fn tolerance(&self) -> Tolerance {
        let mut t = Tolerance::for_format(self.format);
        if let Some(o) = self.tolerance {
            if let Some(eps) = o.eps {
                t.eps = eps;
            }
            if o.flush_below.is_some() {
                t.flush_below = o.flush_below;
            }
            if let Some(strict) = o.strict {
                t.strict = strict;
            }
        }
        t
    }

    /// Whether the packed two-lane path runs.
    pub fn runs_packed(&self) -> bool {
        self.packed && self.format.has_packed_path()
    }
}
