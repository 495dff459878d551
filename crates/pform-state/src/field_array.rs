//! # Field Arrays
//!
//! Dynamic lists inside a form (the person's addresses). Every entry
//! carries an [`EntryId`] that follows it through inserts, removals, and
//! reorders, so a renderer can key its rows by id rather than position.
//!
//! Each action rewrites the list, then moves errors and touched marks to
//! the entries' new indices. Dirty state is recomputed for the list as a
//! whole. Once the form may validate (any mode other than `OnSubmit`, or
//! after the first submit) the list's own error is refreshed, which is how
//! "Provide at least 1 address" appears after removing the last entry.

use pform_core::{EntryId, FieldPath, PformError};
use pform_schema::Resolver;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::binder::FormBinder;
use crate::options::ValidationMode;
use crate::watch::WatchKind;

/// One entry of a field array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    /// Stable identity of the entry.
    pub id: EntryId,
    /// Current position.
    pub index: usize,
    /// Current value.
    pub value: Value,
}

/// Old index to new index; `None` when the entry is gone.
type IndexMap = Vec<Option<usize>>;

/// Mutable view of the list at one path of a form.
///
/// Obtained from [`FormBinder::field_array`]. Holds the form borrowed for
/// as long as the view lives.
#[derive(Debug)]
pub struct FieldArray<'a, R: Resolver> {
    form: &'a mut FormBinder<R>,
    path: FieldPath,
}

impl<R: Resolver> FormBinder<R> {
    /// Open the list at `name`. A missing or `null` value is treated as an
    /// empty list.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for a malformed name, `NotAnArray` when the value is
    /// something other than a list.
    pub fn field_array(&mut self, name: &str) -> Result<FieldArray<'_, R>, PformError> {
        let path = FieldPath::parse(name)?;
        self.sync_ids(&path)?;
        Ok(FieldArray { form: self, path })
    }

    /// Make the tracked ids of `path` match the current list length.
    fn sync_ids(&mut self, path: &FieldPath) -> Result<(), PformError> {
        let len = array_len(&self.values, path)?;
        let ids = self.array_ids.entry(path.clone()).or_default();
        ids.truncate(len);
        while ids.len() < len {
            ids.push(EntryId::new());
        }
        Ok(())
    }

    /// Mint fresh ids for `path` if it is a tracked list whose value was
    /// replaced wholesale.
    pub(crate) fn regenerate_ids_at(&mut self, path: &FieldPath) {
        let tracked: Vec<FieldPath> = self
            .array_ids
            .keys()
            .filter(|a| a.starts_with(path))
            .cloned()
            .collect();
        for array in tracked {
            let len = array_len(&self.values, &array).unwrap_or(0);
            self.array_ids
                .insert(array, (0..len).map(|_| EntryId::new()).collect());
        }
    }

    /// Mint fresh ids for every tracked list.
    pub(crate) fn regenerate_all_ids(&mut self) {
        for (array, ids) in &mut self.array_ids {
            let len = array_len(&self.values, array).unwrap_or(0);
            *ids = (0..len).map(|_| EntryId::new()).collect();
        }
    }

    /// Apply `edit` to the list at `path`, then carry errors and touched
    /// marks along with the entries, update dirty state, notify watchers,
    /// and revalidate the list when the mode allows.
    fn array_action<T>(
        &mut self,
        path: &FieldPath,
        action: &'static str,
        edit: impl FnOnce(&mut Vec<Value>, &mut Vec<EntryId>) -> Result<(T, IndexMap), PformError>,
    ) -> Result<T, PformError> {
        self.sync_ids(path)?;
        // Edit detached copies; a rejected action leaves values and ids alone.
        let mut list = match path.get(&self.values) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(list)) => list.clone(),
            Some(_) => {
                return Err(PformError::NotAnArray {
                    path: path.to_string(),
                })
            }
        };
        let mut ids = self.array_ids.get(path).cloned().unwrap_or_default();

        let (out, map) = edit(&mut list, &mut ids).map_err(|e| {
            warn!(array = %path, action, error = %e, "field array action rejected");
            e
        })?;
        path.set(&mut self.values, Value::Array(list))?;
        self.array_ids.insert(path.clone(), ids);

        let remap = |p: &FieldPath| p.remap_index(path, |i| map.get(i).copied().flatten());
        self.errors.remap_paths(remap);
        self.touched = std::mem::take(&mut self.touched)
            .iter()
            .filter_map(remap)
            .collect();
        self.update_dirty(path);

        debug!(array = %path, action, "field array updated");
        self.listeners
            .notify(Some(path), WatchKind::ArrayAction, &self.values);

        if self.is_submitted || self.options.mode != ValidationMode::OnSubmit {
            self.validate_exact(path);
        } else {
            self.refresh_validity();
        }
        Ok(out)
    }
}

fn array_len(values: &Value, path: &FieldPath) -> Result<usize, PformError> {
    match path.get(values) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(list)) => Ok(list.len()),
        Some(_) => Err(PformError::NotAnArray {
            path: path.to_string(),
        }),
    }
}

fn check_index(path: &FieldPath, index: usize, len: usize) -> Result<(), PformError> {
    if index < len {
        Ok(())
    } else {
        Err(PformError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len,
        })
    }
}

fn identity(len: usize) -> IndexMap {
    (0..len).map(Some).collect()
}

/// Entries at or after `at` shift up by one.
fn shifted_up(len: usize, at: usize) -> IndexMap {
    (0..len).map(|i| Some(if i < at { i } else { i + 1 })).collect()
}

impl<'a, R: Resolver> FieldArray<'a, R> {
    /// Path of the list.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        array_len(&self.form.values, &self.path).unwrap_or(0)
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the entries, in list order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.form
            .array_ids
            .get(&self.path)
            .cloned()
            .unwrap_or_default()
    }

    /// Entries with their ids and current values.
    pub fn fields(&self) -> Vec<FieldEntry> {
        let values = self
            .path
            .get(&self.form.values)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        self.ids()
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(index, (id, value))| FieldEntry {
                id,
                index,
                value: value.clone(),
            })
            .collect()
    }

    /// Add an entry at the end.
    pub fn append(&mut self, value: Value) -> Result<EntryId, PformError> {
        let len = self.len();
        self.insert(len, value)
    }

    /// Add an entry at the start.
    pub fn prepend(&mut self, value: Value) -> Result<EntryId, PformError> {
        self.insert(0, value)
    }

    /// Add an entry at `index`; later entries move down. `index` may be
    /// the current length.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<EntryId, PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "insert", |list, ids| {
            let len = list.len();
            check_index(&path, index, len + 1)?;
            let id = EntryId::new();
            list.insert(index, value);
            ids.insert(index, id);
            Ok((id, shifted_up(len, index)))
        })
    }

    /// Remove the entry at `index` and return its value.
    pub fn remove(&mut self, index: usize) -> Result<Value, PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "remove", |list, ids| {
            let len = list.len();
            check_index(&path, index, len)?;
            ids.remove(index);
            let removed = list.remove(index);
            let map = (0..len)
                .map(|i| match i.cmp(&index) {
                    std::cmp::Ordering::Less => Some(i),
                    std::cmp::Ordering::Equal => None,
                    std::cmp::Ordering::Greater => Some(i - 1),
                })
                .collect();
            Ok((removed, map))
        })
    }

    /// Exchange the entries at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "swap", |list, ids| {
            let len = list.len();
            check_index(&path, a, len)?;
            check_index(&path, b, len)?;
            list.swap(a, b);
            ids.swap(a, b);
            let mut map = identity(len);
            map[a] = Some(b);
            map[b] = Some(a);
            Ok(((), map))
        })
    }

    /// Move the entry at `from` to `to`, shifting the entries between.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<(), PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "move", |list, ids| {
            let len = list.len();
            check_index(&path, from, len)?;
            check_index(&path, to, len)?;
            let value = list.remove(from);
            list.insert(to, value);
            let id = ids.remove(from);
            ids.insert(to, id);
            let map = (0..len)
                .map(|i| {
                    Some(if i == from {
                        to
                    } else if from < i && i <= to {
                        i - 1
                    } else if to <= i && i < from {
                        i + 1
                    } else {
                        i
                    })
                })
                .collect();
            Ok(((), map))
        })
    }

    /// Overwrite the entry at `index`. The entry keeps its id; its errors
    /// and touched marks are dropped.
    pub fn update(&mut self, index: usize, value: Value) -> Result<(), PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "update", |list, _ids| {
            let len = list.len();
            check_index(&path, index, len)?;
            list[index] = value;
            let mut map = identity(len);
            map[index] = None;
            Ok(((), map))
        })
    }

    /// Replace every entry. All entries get new ids.
    pub fn replace(&mut self, values: Vec<Value>) -> Result<(), PformError> {
        let path = self.path.clone();
        self.form.array_action(&path, "replace", |list, ids| {
            let len = list.len();
            *ids = values.iter().map(|_| EntryId::new()).collect();
            *list = values;
            Ok(((), vec![None; len]))
        })
    }
}
