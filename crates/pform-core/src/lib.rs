//! # pform-core: Foundational Types for pform
//!
//! Defines the primitives every other pform crate builds on. Depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Parsed field paths.** Form fields are addressed by `FieldPath`, a
//!    sequence of key and index segments parsed once from dotted strings
//!    such as `addresses.0.country`. Lookups and writes into the untyped
//!    value tree go through it.
//!
//! 2. **Identity newtypes.** Dynamic list entries carry an `EntryId` minted
//!    at creation. Position in the list is never used as identity.
//!
//! 3. **Typed record only after validation.** `Person` and `Address` are the
//!    output of a successful validation pass. Raw form state stays untyped
//!    (`serde_json::Value`) because user input may be mistyped.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod path;
pub mod record;

pub use error::PformError;
pub use identity::EntryId;
pub use path::{FieldPath, PathSegment};
pub use record::{Address, Gender, Person};
