//! Validation results shared by the column, source and sink validators.
//!
//! Validators never stop at the first problem: they collect every hard error
//! and soft warning into a [`ValidationReport`]. A passing check yields a
//! [`Checked`] value that still carries its warnings.

pub mod columns;
pub mod sinks;
pub mod sources;

pub use columns::{validate_columns, ColumnPlan, PlannedColumn, ValidationMode};
pub use sinks::{validate_sink, ValidatedSink, WarehouseBackend};
pub use sources::{validate_source, ValidatedSource};

use serde::Serialize;
use std::fmt;

/// A single field-level validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (e.g. `columns.email`, `sink.index`).
    pub field: String,
    /// Human readable message.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors and warnings collected by a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Record a hard error.
    pub fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Record a soft warning.
    pub fn warn(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Shorthand for `error(ValidationIssue::new(..))`.
    pub fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.error(ValidationIssue::new(field, message));
    }

    /// Shorthand for `warn(ValidationIssue::new(..))`.
    pub fn caution(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warn(ValidationIssue::new(field, message));
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Merge another report into this one.
    pub fn absorb(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Turn the report into a [`CheckResult`], attaching `value` when no error was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> CheckResult<T> {
        if self.is_valid() {
            Ok(Checked {
                value: value(),
                warnings: self.warnings,
            })
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )?;
        if let Some(first) = self.errors.first() {
            write!(f, "; first: {}", first)?;
        }
        Ok(())
    }
}

/// A value that passed validation, with any warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<ValidationIssue>,
}

impl<T> Checked<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Outcome of a validator: the checked value, or every error and warning found.
pub type CheckResult<T> = std::result::Result<Checked<T>, ValidationReport>;
