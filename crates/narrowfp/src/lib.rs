//! # narrowfp
//!
//! Bit-exact narrow floating-point emulation for validating device builtins.
//!
//! Device math builtins evaluated in bfloat16 or half precision are checked
//! against a wide host reference. This crate supplies the pieces such a
//! check needs: bit-level codecs that reproduce the device's narrowing,
//! format-aware tolerance rules, host reference builtins, and a runner that
//! sweeps scalar, vector and packed overloads against any [`builtins::Evaluator`].
//!
//! ## Modules
//!
//! - [`format`]: Format descriptors (epsilon, minimum normal) and rounding modes
//! - [`bf16`]: Truncating bf16 encode/decode and packed two-lane words
//! - [`f16`]: Half-precision codec (truncating and round-to-nearest-even)
//! - [`compare`]: Relative-error comparison, tolerances, ULP distance
//! - [`builtins`]: `fabs`/`fmin`/`fmax`/`fma` references and the evaluator seam
//! - [`vector`]: Vector widths and 3-wide padding layout
//! - [`suite`]: Conformance runner and reports
//! - [`config`]: YAML suite definitions and validation
//! - [`launch`]: Work-group count limit checks for nd-range launches

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]

pub mod bf16;
pub mod builtins;
pub mod compare;
pub mod config;
pub mod error;
pub mod f16;
pub mod format;
pub mod launch;
pub mod suite;
pub mod vector;

pub use builtins::{Builtin, EmulatedDevice, Evaluator};
pub use compare::{Tolerance, approx_equal, half_close};
pub use error::NarrowError;
pub use format::{NarrowFormat, Rounding};
