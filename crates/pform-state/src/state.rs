//! Read-only snapshots of form and field state.

use pform_core::FieldPath;
use pform_schema::ValidationErrors;
use serde::Serialize;

/// Snapshot of the whole form's status flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Values differ from the defaults.
    pub is_dirty: bool,
    /// The full record currently passes validation.
    pub is_valid: bool,
    /// At least one submit was attempted since the last reset.
    pub is_submitted: bool,
    /// The last submit attempt passed validation.
    pub is_submit_successful: bool,
    /// Submit attempts since the last reset.
    pub submit_count: u32,
    /// Paths whose value differs from its default.
    pub dirty_fields: Vec<FieldPath>,
    /// Paths that have lost focus at least once.
    pub touched_fields: Vec<FieldPath>,
    /// Errors currently shown.
    pub errors: ValidationErrors,
}

/// Snapshot of one field's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    /// The field or something below it has an error.
    pub invalid: bool,
    /// The field or something below it differs from its default.
    pub is_dirty: bool,
    /// The field or something below it was blurred.
    pub is_touched: bool,
    /// First error message at exactly this path.
    pub error: Option<String>,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SubmitOutcome {
    /// Validation passed and the valid-callback ran.
    Submitted,
    /// Validation failed; errors are shown and values were kept.
    Invalid {
        /// Number of paths with errors.
        #[serde(rename = "errorPaths")]
        error_paths: usize,
    },
}

impl SubmitOutcome {
    /// Whether the submit went through.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}
