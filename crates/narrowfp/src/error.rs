use thiserror::Error;

use crate::launch::LaunchError;

#[derive(Debug, Error)]
pub enum NarrowError {
    #[error("Failed to read suite file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid suite configuration: {0}")]
    Config(String),

    #[error("Builtin {builtin} takes {expected} argument(s), got {got}")]
    Arity {
        builtin: String,
        expected: usize,
        got: usize,
    },

    #[error("Cannot parse {0}")]
    Parse(String),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(f, "[{prefix}] {}: {}", self.rule, self.message)
    }
}
