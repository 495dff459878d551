//! # pform-cli: Command-Line Interface
//!
//! ## Subcommands
//!
//! - `validate`: check a person record document against the person schema
//! - `replay`: drive a person form through a scripted event sequence
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed input.
//! - Handlers delegate to `pform-schema` and `pform-state`. No validation
//!   logic lives in this crate.
//! - Documents are read as JSON when the file ends in `.json`, as YAML
//!   otherwise.

pub mod input;
pub mod replay;
pub mod validate;
