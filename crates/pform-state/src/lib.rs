//! # pform-state: Form Binder
//!
//! Holds the live state of a form and validates it through a
//! [`Resolver`](pform_schema::Resolver).
//!
//! ## State
//!
//! ```text
//! pristine ──change──▶ dirty
//! untouched ──blur──▶ touched
//! unsubmitted ──submit──▶ submitted (invalid)      values kept, errors shown
//!             └─submit──▶ submitted (successful)   values reset to defaults
//! ```
//!
//! ## Validation Triggers
//!
//! Before the first submit attempt, fields validate according to
//! [`ValidationMode`]; afterwards according to [`ReValidateMode`]. Submit
//! always validates the whole record, and [`FormBinder::trigger`] validates
//! on demand. Whatever the trigger, the resolver sees the full value tree;
//! only the errors for the targeted paths are refreshed.
//!
//! ## Field Arrays
//!
//! [`FormBinder::field_array`] hands out a [`FieldArray`] for list-valued
//! fields. Every entry carries an [`EntryId`](pform_core::EntryId) minted at
//! creation; errors and touched state move with their entry when the list
//! is reordered.
//!
//! ## Watching
//!
//! [`FormBinder::watch`] registers listeners that run synchronously after
//! each value mutation. They observe; they never force a refresh of
//! unrelated fields.

pub mod binder;
pub mod field_array;
pub mod options;
pub mod state;
pub mod watch;

pub use binder::{FieldRegistration, FormBinder, PersonForm};
pub use field_array::{FieldArray, FieldEntry};
pub use options::{
    FieldKind, FormOptions, ReValidateMode, RegisterOptions, SetValueOptions, ValidationMode,
};
pub use state::{FieldState, FormState, SubmitOutcome};
pub use watch::{WatchEvent, WatchHandle, WatchKind};
