//! # Schemas and the Resolver Contract
//!
//! A [`Schema`] pairs an [`ObjectShape`] with a list of cross-field
//! [`Refinement`]s. Validation runs in two strict phases:
//!
//! 1. the shape checks every field and produces the coerced object;
//! 2. only if phase 1 reported nothing, the object is deserialized into
//!    `T` and each refinement runs against the typed value.
//!
//! The [`Resolver`] trait is what a form binder validates through; any
//! schema is a resolver for its output type.

use std::fmt;
use std::marker::PhantomData;

use pform_core::FieldPath;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ValidationErrors;
use crate::shape::{Checked, ObjectShape};

/// Validates an untyped value tree into a typed output.
pub trait Resolver {
    /// The typed record produced on success.
    type Output;

    /// Validate the full value tree.
    fn resolve(&self, values: &Value) -> Result<Self::Output, ValidationErrors>;
}

type Check<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A cross-field rule over the typed record.
pub struct Refinement<T> {
    path: FieldPath,
    message: String,
    check: Check<T>,
}

impl<T> Refinement<T> {
    /// A rule that reports `message` at `path` when `check` returns false.
    pub fn new(
        path: FieldPath,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            path,
            message: message.into(),
            check: Box::new(check),
        }
    }

    /// Path the failure is attached to.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Message reported on failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<T> fmt::Debug for Refinement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("path", &self.path.to_string())
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Object shape plus cross-field refinements, producing `T`.
pub struct Schema<T> {
    shape: ObjectShape,
    refinements: Vec<Refinement<T>>,
    _output: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("shape", &self.shape)
            .field("refinements", &self.refinements)
            .finish()
    }
}

impl<T: DeserializeOwned> Schema<T> {
    /// A schema with no refinements.
    pub fn new(shape: ObjectShape) -> Self {
        Self {
            shape,
            refinements: Vec::new(),
            _output: PhantomData,
        }
    }

    /// Add a cross-field refinement.
    pub fn refine(
        mut self,
        path: FieldPath,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.refinements.push(Refinement::new(path, message, check));
        self
    }

    /// The object shape checked in phase 1.
    pub fn shape(&self) -> &ObjectShape {
        &self.shape
    }

    /// The refinements checked in phase 2.
    pub fn refinements(&self) -> &[Refinement<T>] {
        &self.refinements
    }

    /// Validate `candidate`, returning the typed record or every error.
    pub fn validate(&self, candidate: &Value) -> Result<T, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut path = FieldPath::root();

        let coerced = self.shape.check(Some(candidate), &mut path, &mut errors);
        let object = match coerced {
            Checked::Valid(object) if errors.is_empty() => object,
            _ => {
                tracing::debug!(paths = errors.len(), "field rules failed");
                return Err(errors);
            }
        };

        let typed: T = match serde_json::from_value(object) {
            Ok(typed) => typed,
            Err(e) => {
                errors.add(FieldPath::root(), e.to_string());
                return Err(errors);
            }
        };

        for refinement in &self.refinements {
            if !(refinement.check)(&typed) {
                errors.add(refinement.path.clone(), refinement.message.clone());
            }
        }

        if errors.is_empty() {
            Ok(typed)
        } else {
            tracing::debug!(paths = errors.len(), "cross-field rules failed");
            Err(errors)
        }
    }
}

impl<T: DeserializeOwned> Resolver for Schema<T> {
    type Output = T;

    fn resolve(&self, values: &Value) -> Result<T, ValidationErrors> {
        self.validate(values)
    }
}
