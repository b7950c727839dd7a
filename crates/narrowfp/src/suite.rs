//! Conformance runner for narrow builtins.
//!
//! For each selected builtin and vector width the runner encodes the sample
//! operands, hands them to an [`Evaluator`], decodes the results and checks
//! every live lane against the host reference with the suite tolerance.
//!
//! bf16 suites also exercise the packed two-lane overload: lane `i` of
//! vector groups `g` and `g + 1` (for even `g`) share one 32-bit word.
//! A trailing even group without a partner is not packed.

use serde::Serialize;

use crate::bf16;
use crate::builtins::{Builtin, Evaluator};
use crate::compare::Tolerance;
use crate::config::{SuiteConfig, validate_config};
use crate::error::{NarrowError, Severity};
use crate::f16;
use crate::format::NarrowFormat;
use crate::vector::VecWidth;

// ────────────────────────────────────────────────────────────────────────────
// Samples
// ────────────────────────────────────────────────────────────────────────────

/// Operand buffers `a`, `b`, `c` for a suite run.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub a: Vec<f32>,
    pub b: Vec<f32>,
    pub c: Vec<f32>,
}

impl Samples {
    /// Standard sample operands for `format`.
    ///
    /// bf16: `a = (i - n/2)/n`, `b = (n/2 - i)/n`, `c = 3i`.
    /// half: `a = i/n`, `b = (n - i)/n`, `c = 3i`, each rounded to half.
    pub fn generate(format: NarrowFormat, n: usize) -> Self {
        let nf = n as f32;
        let half_n = (n / 2) as f32;
        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        let mut c = Vec::with_capacity(n);
        for i in 0..n {
            let fi = i as f32;
            match format {
                NarrowFormat::Bf16 => {
                    a.push((fi - half_n) / nf);
                    b.push((half_n - fi) / nf);
                    c.push(3.0 * fi);
                }
                NarrowFormat::Half => {
                    a.push(f16::quantize(fi / nf));
                    b.push(f16::quantize((nf - fi) / nf));
                    c.push(f16::quantize(3.0 * fi));
                }
            }
        }
        Self { a, b, c }
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// The first `arity` operand buffers.
    pub fn operands(&self, arity: usize) -> Vec<&[f32]> {
        [&self.a[..], &self.b[..], &self.c[..]]
            .into_iter()
            .take(arity)
            .collect()
    }

    /// Operands at flat index `idx`.
    pub fn args(&self, idx: usize) -> [f32; 3] {
        [self.a[idx], self.b[idx], self.c[idx]]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

/// Which overload a case exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePath {
    /// One 16-bit value per lane.
    Narrow,
    /// Two 16-bit values per 32-bit lane.
    Packed,
}

impl std::fmt::Display for CasePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Narrow => f.write_str("narrow"),
            Self::Packed => f.write_str("packed"),
        }
    }
}

/// A lane whose device result is outside tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub builtin: Builtin,
    pub width: VecWidth,
    pub path: CasePath,
    /// Flat sample index.
    pub index: usize,
    pub expected: f32,
    pub actual: f32,
}

/// Outcome of one builtin × width × path combination.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub builtin: Builtin,
    pub width: VecWidth,
    pub path: CasePath,
    /// Lanes compared.
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Aggregate counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteTotals {
    pub cases: usize,
    pub failed_cases: usize,
    pub checked: usize,
    pub mismatches: usize,
}

/// Result of a suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub format: NarrowFormat,
    pub evaluator: String,
    pub tolerance: Tolerance,
    pub cases: Vec<CaseResult>,
    pub totals: SuiteTotals,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.totals.mismatches == 0
    }

    /// Pretty-printed JSON form of the report.
    ///
    /// # Errors
    ///
    /// Returns [`NarrowError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, NarrowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

/// Run every case `config` selects against `evaluator`.
///
/// # Errors
///
/// Returns [`NarrowError::Config`] if the configuration has
/// error-severity violations.
pub fn run_suite(
    config: &SuiteConfig,
    evaluator: &dyn Evaluator,
) -> Result<SuiteReport, NarrowError> {
    let errors: Vec<String> = validate_config(config)
        .into_iter()
        .filter(|v| v.severity == Severity::Error)
        .map(|v| v.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(NarrowError::Config(errors.join("; ")));
    }

    let samples = Samples::generate(config.format, config.samples);
    let tolerance = config.tolerance();
    tracing::info!(
        suite = %config.metadata.name,
        format = %config.format,
        evaluator = evaluator.name(),
        samples = samples.len(),
        "running suite"
    );

    let mut cases = Vec::new();
    for &builtin in &config.builtins {
        for &width in &config.widths {
            cases.push(run_case(
                config.format,
                builtin,
                width,
                &samples,
                &tolerance,
                evaluator,
            ));
            if config.runs_packed() {
                cases.push(run_packed_case(
                    builtin, width, &samples, &tolerance, evaluator,
                ));
            }
        }
    }

    let mut totals = SuiteTotals {
        cases: cases.len(),
        ..SuiteTotals::default()
    };
    for case in &cases {
        totals.checked += case.checked;
        totals.mismatches += case.mismatches.len();
        if !case.passed() {
            totals.failed_cases += 1;
        }
    }
    tracing::info!(
        cases = totals.cases,
        failed = totals.failed_cases,
        checked = totals.checked,
        "suite finished"
    );

    Ok(SuiteReport {
        suite: config.metadata.name.clone(),
        format: config.format,
        evaluator: evaluator.name().to_string(),
        tolerance,
        cases,
        totals,
    })
}

fn encode(format: NarrowFormat, x: f32) -> u16 {
    match format {
        NarrowFormat::Bf16 => bf16::narrow_encode(x),
        NarrowFormat::Half => f16::f32_to_f16_rne(x),
    }
}

fn decode(format: NarrowFormat, bits: u16) -> f32 {
    match format {
        NarrowFormat::Bf16 => bf16::narrow_decode(bits),
        NarrowFormat::Half => f16::f16_to_f32(bits),
    }
}

/// Host value a device lane must match.
///
/// bf16 compares against the f32 result on the unnarrowed inputs; half
/// compares against the host half result.
fn expected(format: NarrowFormat, builtin: Builtin, args: &[f32]) -> f32 {
    let wide = builtin.reference(args);
    match format {
        NarrowFormat::Bf16 => wide,
        NarrowFormat::Half => f16::quantize(wide),
    }
}

/// Lane bookkeeping for one case.
struct CaseRecorder<'t> {
    builtin: Builtin,
    width: VecWidth,
    path: CasePath,
    tolerance: &'t Tolerance,
    checked: usize,
    mismatches: Vec<Mismatch>,
}

impl<'t> CaseRecorder<'t> {
    fn new(builtin: Builtin, width: VecWidth, path: CasePath, tolerance: &'t Tolerance) -> Self {
        tracing::debug!(%builtin, %width, %path, "case started");
        Self {
            builtin,
            width,
            path,
            tolerance,
            checked: 0,
            mismatches: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, expected: f32, actual: f32) {
        self.checked += 1;
        if !self.tolerance.check(actual, expected) {
            tracing::warn!(
                builtin = %self.builtin,
                width = %self.width,
                path = %self.path,
                index,
                expected,
                actual,
                "lane outside tolerance"
            );
            self.mismatches.push(Mismatch {
                builtin: self.builtin,
                width: self.width,
                path: self.path,
                index,
                expected,
                actual,
            });
        }
    }

    fn finish(self) -> CaseResult {
        tracing::debug!(
            builtin = %self.builtin,
            width = %self.width,
            path = %self.path,
            checked = self.checked,
            mismatches = self.mismatches.len(),
            "case finished"
        );
        CaseResult {
            builtin: self.builtin,
            width: self.width,
            path: self.path,
            checked: self.checked,
            mismatches: self.mismatches,
        }
    }
}

/// Run the 16-bit-per-lane overload of `builtin` at `width`.
pub fn run_case(
    format: NarrowFormat,
    builtin: Builtin,
    width: VecWidth,
    samples: &Samples,
    tolerance: &Tolerance,
    evaluator: &dyn Evaluator,
) -> CaseResult {
    let arity = builtin.arity();
    let encoded: Vec<Vec<u16>> = samples
        .operands(arity)
        .into_iter()
        .map(|op| op.iter().map(|&x| encode(format, x)).collect())
        .collect();

    let mut lane_args: Vec<Vec<u16>> = vec![Vec::new(); arity];
    let mut out = vec![0u16; width.lanes()];
    let mut recorder = CaseRecorder::new(builtin, width, CasePath::Narrow, tolerance);

    for g in 0..width.groups(samples.len()) {
        for (k, enc) in encoded.iter().enumerate() {
            width.gather(enc, g, &mut lane_args[k]);
        }
        let refs: Vec<&[u16]> = lane_args.iter().map(Vec::as_slice).collect();
        if width == VecWidth::SCALAR {
            let scalar: Vec<u16> = refs.iter().map(|r| r[0]).collect();
            out[0] = match format {
                NarrowFormat::Bf16 => evaluator.eval_bf16(builtin, &scalar),
                NarrowFormat::Half => evaluator.eval_half(builtin, &scalar),
            };
        } else {
            match format {
                NarrowFormat::Bf16 => evaluator.eval_bf16_vec(builtin, &refs, &mut out),
                NarrowFormat::Half => evaluator.eval_half_vec(builtin, &refs, &mut out),
            }
        }

        for (lane, &bits) in out.iter().enumerate() {
            let idx = width.index(g, lane);
            let want = expected(format, builtin, &samples.args(idx)[..arity]);
            recorder.record(idx, want, decode(format, bits));
        }
    }

    recorder.finish()
}

/// Run the packed two-lane bf16 overload of `builtin` at `width`.
pub fn run_packed_case(
    builtin: Builtin,
    width: VecWidth,
    samples: &Samples,
    tolerance: &Tolerance,
    evaluator: &dyn Evaluator,
) -> CaseResult {
    let arity = builtin.arity();
    let operands = samples.operands(arity);
    let groups = width.groups(samples.len());

    let mut words: Vec<Vec<u32>> = vec![Vec::with_capacity(width.lanes()); arity];
    let mut out = vec![0u32; width.lanes()];
    let mut recorder = CaseRecorder::new(builtin, width, CasePath::Packed, tolerance);

    for g in (0..groups).step_by(2) {
        if g + 1 >= groups {
            break;
        }
        for (k, op) in operands.iter().enumerate() {
            words[k].clear();
            words[k].extend((0..width.lanes()).map(|l| {
                bf16::narrow_encode_pair(op[width.index(g, l)], op[width.index(g + 1, l)])
            }));
        }
        let refs: Vec<&[u32]> = words.iter().map(Vec::as_slice).collect();
        if width == VecWidth::SCALAR {
            let scalar: Vec<u32> = refs.iter().map(|r| r[0]).collect();
            out[0] = evaluator.eval_bf16x2(builtin, &scalar);
        } else {
            evaluator.eval_bf16x2_vec(builtin, &refs, &mut out);
        }

        for (lane, &word) in out.iter().enumerate() {
            let (lo, hi) = bf16::narrow_decode_pair(word);
            let idx_lo = width.index(g, lane);
            let idx_hi = width.index(g + 1, lane);
            let want_lo = builtin.reference(&samples.args(idx_lo)[..arity]);
            let want_hi = builtin.reference(&samples.args(idx_hi)[..arity]);
            recorder.record(idx_lo, want_lo, lo);
            recorder.record(idx_hi, want_hi, hi);
        }
    }

    recorder.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Text rendering
// ────────────────────────────────────────────────────────────────────────────

/// Render a report as a human-readable table.
pub fn format_text(report: &SuiteReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Suite: {} ({}, evaluator {})",
        report.suite, report.format, report.evaluator
    );
    let _ = writeln!(
        out,
        "Tolerance: eps={} strict={} flush_below={}",
        report.tolerance.eps,
        report.tolerance.strict,
        report
            .tolerance
            .flush_below
            .map_or_else(|| "-".to_string(), |f| f.to_string())
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<8} {:>5} {:<8} {:>7} {:>10}  status",
        "builtin", "width", "path", "checked", "mismatches"
    );
    for case in &report.cases {
        let status = if case.passed() { "PASS" } else { "FAIL" };
        let _ = writeln!(
            out,
            "{:<8} {:>5} {:<8} {:>7} {:>10}  {status}",
            case.builtin,
            case.width,
            case.path,
            case.checked,
            case.mismatches.len()
        );
        for m in case.mismatches.iter().take(3) {
            let _ = writeln!(
                out,
                "    [{}] expected {} got {}",
                m.index, m.expected, m.actual
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} case(s), {} failed, {} lane(s) checked, {} mismatch(es)",
        report.totals.cases,
        report.totals.failed_cases,
        report.totals.checked,
        report.totals.mismatches
    );
    out.push_str(if report.passed() { "passed\n" } else { "failed\n" });
    out
}
