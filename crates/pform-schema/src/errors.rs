//! # Validation Errors
//!
//! Path-keyed collection of user-facing messages produced by a failed
//! validation pass. Each path keeps its messages in the order the rules
//! reported them; the first one is what a form displays.

use std::collections::BTreeMap;
use std::fmt;

use pform_core::FieldPath;
use serde::{Deserialize, Serialize};

/// A single failure attached to one field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the failing field.
    pub path: FieldPath,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Map from field path to the messages reported for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldPath, Vec<String>>,
}

impl ValidationErrors {
    /// An empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `path`.
    pub fn add(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.entry(path).or_default().push(message.into());
    }

    /// Returns true if no path has an error.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of paths with at least one error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All messages for `path`.
    pub fn get(&self, path: &FieldPath) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    /// The first message for `path`, the one a form shows.
    pub fn first(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path)?.first().map(String::as_str)
    }

    /// Whether `path` itself has an error.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.errors.contains_key(path)
    }

    /// Whether `path` or any path below it has an error.
    pub fn has_errors_under(&self, path: &FieldPath) -> bool {
        self.errors.keys().any(|p| p.starts_with(path))
    }

    /// Paths with errors, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.errors.keys()
    }

    /// Every (path, message) pair, in path order.
    pub fn iter(&self) -> impl Iterator<Item = FieldError> + '_ {
        self.errors.iter().flat_map(|(path, messages)| {
            messages.iter().map(move |m| FieldError {
                path: path.clone(),
                message: m.clone(),
            })
        })
    }

    /// Keep only the entries at or below one of `scopes`.
    pub fn scoped_to(&self, scopes: &[FieldPath]) -> Self {
        let errors = self
            .errors
            .iter()
            .filter(|(path, _)| scopes.iter().any(|s| path.starts_with(s)))
            .map(|(p, m)| (p.clone(), m.clone()))
            .collect();
        Self { errors }
    }

    /// Drop every entry at or below `scope`.
    pub fn clear_under(&mut self, scope: &FieldPath) {
        self.errors.retain(|path, _| !path.starts_with(scope));
    }

    /// Replace the messages for `path`.
    pub fn set(&mut self, path: FieldPath, messages: Vec<String>) {
        if messages.is_empty() {
            self.errors.remove(&path);
        } else {
            self.errors.insert(path, messages);
        }
    }

    /// Merge `other` into `self`, appending messages per path.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (path, mut messages) in other.errors {
            self.errors.entry(path).or_default().append(&mut messages);
        }
    }

    /// Rebuild the map with every path passed through `map`; paths mapped
    /// to `None` are dropped.
    pub fn remap_paths(&mut self, map: impl Fn(&FieldPath) -> Option<FieldPath>) {
        let old = std::mem::take(&mut self.errors);
        for (path, messages) in old {
            if let Some(new) = map(&path) {
                self.errors.entry(new).or_default().extend(messages);
            }
        }
    }

    /// Consumes self and returns the inner map.
    pub fn into_inner(self) -> BTreeMap<FieldPath, Vec<String>> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
