//! # Field Paths
//!
//! A `FieldPath` addresses one node in a form's value tree. The textual
//! form is dotted, with array positions written as bare numbers:
//!
//! ```text
//! firstName
//! addresses
//! addresses.0.country
//! ```
//!
//! Paths are parsed once and then compared segment-wise, so
//! `addresses.1` is never mistaken for a prefix of `addresses.10`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PformError;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A parsed, dotted field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, addressing the whole value tree.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. Purely numeric segments become indices.
    ///
    /// # Errors
    ///
    /// Returns `PformError::InvalidPath` for an empty string or an empty
    /// segment (`a..b`, `.a`, `a.`).
    pub fn parse(s: &str) -> Result<Self, PformError> {
        if s.is_empty() {
            return Err(PformError::InvalidPath {
                path: s.to_string(),
                reason: "path is empty".to_string(),
            });
        }
        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(PformError::InvalidPath {
                    path: s.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                match part.parse::<usize>() {
                    Ok(i) => PathSegment::Index(i),
                    Err(e) => {
                        return Err(PformError::InvalidPath {
                            path: s.to_string(),
                            reason: e.to_string(),
                        })
                    }
                }
            } else {
                PathSegment::Key(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self(segments))
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `key` appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push_key(key);
        next
    }

    /// A new path with `index` appended.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    /// Append a key segment in place.
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(PathSegment::Key(key.into()));
    }

    /// Append an index segment in place.
    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Whether `prefix` is this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Whether either path is an ancestor of (or equal to) the other.
    pub fn is_related(&self, other: &FieldPath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Rewrite the index segment that immediately follows `array`.
    ///
    /// Paths outside `array` (or pointing at `array` itself) come back
    /// unchanged as `Some`. For paths below an entry, `map` receives the old
    /// index and returns the new one, or `None` when the entry is gone, in
    /// which case this returns `None`.
    pub fn remap_index(
        &self,
        array: &FieldPath,
        map: impl Fn(usize) -> Option<usize>,
    ) -> Option<FieldPath> {
        if !self.starts_with(array) || self.0.len() == array.0.len() {
            return Some(self.clone());
        }
        match &self.0[array.0.len()] {
            PathSegment::Index(old) => {
                let new = map(*old)?;
                let mut segments = self.0.clone();
                segments[array.0.len()] = PathSegment::Index(new);
                Some(Self(segments))
            }
            PathSegment::Key(_) => Some(self.clone()),
        }
    }

    /// Look up the value this path addresses.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.0 {
            current = match segment {
                PathSegment::Key(k) => current.as_object()?.get(k)?,
                PathSegment::Index(i) => current.as_array()?.get(*i)?,
            };
        }
        Some(current)
    }

    /// Mutable lookup of the value this path addresses.
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for segment in &self.0 {
            current = match segment {
                PathSegment::Key(k) => current.as_object_mut()?.get_mut(k)?,
                PathSegment::Index(i) => current.as_array_mut()?.get_mut(*i)?,
            };
        }
        Some(current)
    }

    /// Write `value` at this path, creating intermediate containers.
    ///
    /// Missing or `null` intermediates become objects or arrays depending
    /// on the next segment. An index may address an existing element or
    /// the position one past the end, which appends.
    ///
    /// # Errors
    ///
    /// `InvalidPath` when an intermediate value is a scalar or the path is
    /// the root; `IndexOutOfRange` when an index skips past the end. On
    /// error `root` is left exactly as it was.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), PformError> {
        let mut scratch = root.clone();
        self.write(&mut scratch, value)?;
        *root = scratch;
        Ok(())
    }

    fn write(&self, root: &mut Value, value: Value) -> Result<(), PformError> {
        let Some((last, parents)) = self.0.split_last() else {
            return Err(self.invalid("cannot assign to the root path"));
        };

        let mut current = root;
        for (depth, segment) in parents.iter().enumerate() {
            let next_is_index = matches!(self.0[depth + 1], PathSegment::Index(_));
            let empty = if next_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
            current = self.child_or_insert(current, segment, depth, empty)?;
        }

        match last {
            PathSegment::Key(k) => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| self.invalid("parent is not an object"))?;
                obj.insert(k.clone(), value);
            }
            PathSegment::Index(i) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                let parent = FieldPath(parents.to_vec());
                let arr = current
                    .as_array_mut()
                    .ok_or_else(|| PformError::NotAnArray {
                        path: parent.to_string(),
                    })?;
                if *i < arr.len() {
                    arr[*i] = value;
                } else if *i == arr.len() {
                    arr.push(value);
                } else {
                    return Err(PformError::IndexOutOfRange {
                        path: parent.to_string(),
                        index: *i,
                        len: arr.len(),
                    });
                }
            }
        }
        Ok(())
    }

    fn child_or_insert<'a>(
        &self,
        current: &'a mut Value,
        segment: &PathSegment,
        depth: usize,
        empty: Value,
    ) -> Result<&'a mut Value, PformError> {
        match segment {
            PathSegment::Key(k) => {
                if current.is_null() {
                    *current = Value::Object(Map::new());
                }
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| self.invalid("intermediate value is not an object"))?;
                let child = obj.entry(k.clone()).or_insert(Value::Null);
                if child.is_null() {
                    *child = empty;
                }
                Ok(child)
            }
            PathSegment::Index(i) => {
                if current.is_null() {
                    *current = Value::Array(Vec::new());
                }
                let arr = current.as_array_mut().ok_or_else(|| PformError::NotAnArray {
                    path: FieldPath(self.0[..depth].to_vec()).to_string(),
                })?;
                if *i == arr.len() {
                    arr.push(Value::Null);
                }
                let len = arr.len();
                let child = arr.get_mut(*i).ok_or_else(|| PformError::IndexOutOfRange {
                    path: FieldPath(self.0[..depth].to_vec()).to_string(),
                    index: *i,
                    len,
                })?;
                if child.is_null() {
                    *child = empty;
                }
                Ok(child)
            }
        }
    }

    fn invalid(&self, reason: &str) -> PformError {
        PformError::InvalidPath {
            path: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The serialized form. Unlike [`FieldPath::parse`], the empty string is
/// accepted as the root path so root-level error keys survive a roundtrip.
impl TryFrom<String> for FieldPath {
    type Error = PformError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = PformError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        Self::parse(s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = PathSegment> {
        prop_oneof![
            "[a-zA-Z][a-zA-Z0-9_]{0,8}".prop_map(PathSegment::Key),
            (0usize..50).prop_map(PathSegment::Index),
        ]
    }

    proptest! {
        /// Rendering then parsing a path yields the same path.
        #[test]
        fn display_parse_roundtrip(segments in prop::collection::vec(segment(), 1..6)) {
            let path = FieldPath(segments);
            let reparsed = FieldPath::parse(&path.to_string()).unwrap();
            prop_assert_eq!(reparsed, path);
        }
    }
}
