use std::path::Path;

use crate::config::types::SuiteConfig;
use crate::error::NarrowError;

/// Parse a YAML suite file into a [`SuiteConfig`].
///
/// # Errors
///
/// Returns [`NarrowError::Io`] if the file cannot be read,
/// or [`NarrowError::Yaml`] if the YAML is malformed.
pub fn parse_config(path: &Path) -> Result<SuiteConfig, NarrowError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a YAML suite from a string.
pub fn parse_config_str(yaml: &str) -> Result<SuiteConfig, NarrowError> {
    let config: SuiteConfig = serde_yaml::from_str(yaml)?;
    Ok(config)
}
