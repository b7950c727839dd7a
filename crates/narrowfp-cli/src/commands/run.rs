use std::path::Path;

use narrowfp::config::{SuiteConfig, parse_config};
use narrowfp::suite::{format_text, run_suite};
use narrowfp::{EmulatedDevice, NarrowFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown format '{other}', expected 'text' or 'json'"
            )),
        }
    }
}

pub fn run(
    suite: Option<&Path>,
    ty: NarrowFormat,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match suite {
        Some(path) => parse_config(path)?,
        None => SuiteConfig::default_for(ty),
    };
    let device = EmulatedDevice::new(config.rounding);
    let report = run_suite(&config, &device)?;

    match format {
        OutputFormat::Json => {
            println!("{}", report.to_json()?);
        }
        OutputFormat::Text => {
            print!("{}", format_text(&report));
        }
    }

    if report.passed() {
        Ok(())
    } else {
        Err(format!(
            "{} mismatch(es) in {} case(s)",
            report.totals.mismatches, report.totals.failed_cases
        )
        .into())
    }
}
