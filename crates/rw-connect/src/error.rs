//! Error types for the connector compiler.

use thiserror::Error;

use crate::validate::ValidationReport;

/// Main error type for compiler operations.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Configuration error (invalid YAML shape, bad identifier, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more validation rules failed
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// Explicitly requested tables are missing from the discovered schema (strict mode)
    #[error("Table selection failed: {0}")]
    Selection(String),

    /// Schema discovery failed
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// One or more compilation units failed
    #[error("Compilation failed for {failed} of {total} units")]
    Compile { failed: usize, total: usize },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConnectError {
    /// Create a Pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectError::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a Discovery error
    pub fn discovery(message: impl Into<String>) -> Self {
        ConnectError::Discovery(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConnectError::Config(_)
            | ConnectError::Pattern { .. }
            | ConnectError::Yaml(_)
            | ConnectError::Json(_) => 1,
            ConnectError::Validation(_) => 2,
            ConnectError::Selection(_) => 3,
            ConnectError::Discovery(_) => 4,
            ConnectError::Compile { .. } => 5,
            ConnectError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        if let ConnectError::Validation(report) = self {
            for issue in &report.errors {
                output.push_str(&format!("\n  error: {}", issue));
            }
            for issue in &report.warnings {
                output.push_str(&format!("\n  warning: {}", issue));
            }
        }

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

impl From<ValidationReport> for ConnectError {
    fn from(report: ValidationReport) -> Self {
        ConnectError::Validation(report)
    }
}

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, ConnectError>;
