//! # Validate Subcommand
//!
//! Checks one candidate record against the person schema and prints either
//! `ok` with the typed record, or one `path: message` line per failure.

use std::path::PathBuf;

use clap::Args;
use pform_core::Person;
use pform_schema::{person_schema, Resolver, ValidationErrors};
use serde_json::Value;

use crate::input::load_document;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record document (JSON or YAML).
    pub file: PathBuf,
}

/// Result of checking one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Valid(Person),
    Invalid(ValidationErrors),
}

impl Report {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Lines to print.
    pub fn render(&self) -> anyhow::Result<Vec<String>> {
        match self {
            Self::Valid(person) => Ok(vec![
                "ok".to_string(),
                serde_json::to_string_pretty(person)?,
            ]),
            Self::Invalid(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }
}

/// Validate a candidate record.
pub fn check(candidate: &Value) -> Report {
    match person_schema().resolve(candidate) {
        Ok(person) => Report::Valid(person),
        Err(errors) => Report::Invalid(errors),
    }
}

/// Run the subcommand. Exit code 0 for a valid record, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    let candidate: Value = load_document(&args.file)?;
    let report = check(&candidate);
    tracing::info!(
        file = %args.file.display(),
        valid = report.is_valid(),
        "record checked"
    );
    for line in report.render()? {
        println!("{line}");
    }
    Ok(if report.is_valid() { 0 } else { 1 })
}
