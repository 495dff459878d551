//! # pform-schema: Record Validation
//!
//! Validates an untyped candidate record (`serde_json::Value`) against a
//! declarative schema and either returns the typed record or a map from
//! field path to messages.
//!
//! ## Two Phases
//!
//! 1. **Shape** ([`shape`]): every field rule runs, with coercion where the
//!    rule asks for it. Failures are collected across all fields in one pass.
//! 2. **Refinements** ([`schema`]): cross-field checks over the typed record.
//!    They only run when phase 1 produced no errors, so a record never shows
//!    a cross-field error stacked on top of field errors.
//!
//! ## Resolver Contract
//!
//! [`Resolver`] is the seam a form binder validates through. [`Schema`]
//! implements it; [`person_schema`] builds the schema for person records.
//!
//! ## Crate Policy
//!
//! - Validation failures are data ([`ValidationErrors`]), never panics.
//! - Depends only on `pform-core` internally.

pub mod email;
pub mod errors;
pub mod person;
pub mod schema;
pub mod shape;

pub use errors::{FieldError, ValidationErrors};
pub use person::{person_schema, PersonSchema};
pub use schema::{Refinement, Resolver, Schema};
pub use shape::{ArrayRule, BooleanRule, Checked, EnumRule, Node, NumberRule, ObjectShape, StringRule};
