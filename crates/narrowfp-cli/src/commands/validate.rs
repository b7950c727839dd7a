use std::path::Path;

use narrowfp::config::{parse_config, validate_config};
use narrowfp::error::Severity;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_config(path)?;
    let violations = validate_config(&config);

    let errors: Vec<_> = violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .collect();
    let warnings: Vec<_> = violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .collect();

    for v in &violations {
        println!("{v}");
    }

    println!(
        "\n{} error(s), {} warning(s)",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        println!("Suite is valid.");
        Ok(())
    } else {
        Err(format!("Suite has {} validation error(s)", errors.len()).into())
    }
}
