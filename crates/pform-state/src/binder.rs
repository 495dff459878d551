//! # Form Binder
//!
//! `FormBinder` owns the value tree of one form and everything derived from
//! it: errors, dirty and touched paths, submit bookkeeping, field-array
//! entry ids, and watch listeners. All mutation goes through `&mut self`;
//! nothing here blocks or spawns.
//!
//! Values are kept untyped (`serde_json::Value`). The resolver turns them
//! into the typed record on submit; until then any JSON a widget produces
//! can be stored and validated.

use std::collections::{BTreeMap, BTreeSet};

use pform_core::{EntryId, FieldPath, PformError};
use pform_schema::shape::type_name;
use pform_schema::{person_schema, PersonSchema, Resolver, ValidationErrors};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::options::{
    FormOptions, ReValidateMode, RegisterOptions, SetValueOptions, ValidationMode,
};
use crate::state::{FieldState, FormState, SubmitOutcome};
use crate::watch::{Listeners, WatchEvent, WatchHandle, WatchKind};

/// Binder for person records.
pub type PersonForm = FormBinder<PersonSchema>;

/// Input event that may trigger field validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Change,
    Blur,
}

/// Wiring between one input and the binder.
///
/// Returned by [`FormBinder::register`]. The renderer shows [`value`] and
/// routes the input's change and blur events through [`on_change`] and
/// [`on_blur`].
///
/// [`value`]: FieldRegistration::value
/// [`on_change`]: FieldRegistration::on_change
/// [`on_blur`]: FieldRegistration::on_blur
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRegistration {
    name: FieldPath,
    options: RegisterOptions,
    value: Value,
}

impl FieldRegistration {
    /// Path the input is bound to.
    pub fn name(&self) -> &FieldPath {
        &self.name
    }

    /// Value at registration time.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Registration options.
    pub fn options(&self) -> RegisterOptions {
        self.options
    }

    /// Handle an input change with the raw widget value.
    pub fn on_change<R: Resolver>(
        &self,
        form: &mut FormBinder<R>,
        raw: Value,
    ) -> Result<(), PformError> {
        form.change_path(&self.name, self.options.convert(raw))
    }

    /// Handle the input losing focus.
    pub fn on_blur<R: Resolver>(&self, form: &mut FormBinder<R>) {
        form.blur_path(&self.name);
    }
}

/// Live state of one form, validated through `R`.
#[derive(Debug)]
pub struct FormBinder<R: Resolver> {
    pub(crate) resolver: R,
    pub(crate) options: FormOptions,
    pub(crate) defaults: Value,
    pub(crate) values: Value,
    pub(crate) errors: ValidationErrors,
    pub(crate) touched: BTreeSet<FieldPath>,
    pub(crate) dirty: BTreeSet<FieldPath>,
    pub(crate) is_dirty: bool,
    pub(crate) is_valid: bool,
    pub(crate) is_submitted: bool,
    pub(crate) is_submit_successful: bool,
    pub(crate) submit_count: u32,
    pub(crate) registered: BTreeMap<FieldPath, RegisterOptions>,
    pub(crate) array_ids: BTreeMap<FieldPath, Vec<EntryId>>,
    pub(crate) listeners: Listeners,
}

impl FormBinder<PersonSchema> {
    /// A person form with the person schema and options.
    pub fn person() -> Self {
        Self::new(person_schema(), FormOptions::person())
    }
}

impl<R: Resolver> FormBinder<R> {
    /// Create a binder holding `options.default_values`.
    ///
    /// Defaults that are not an object are replaced by an empty object.
    pub fn new(resolver: R, options: FormOptions) -> Self {
        let defaults = if options.default_values.is_object() {
            options.default_values.clone()
        } else {
            Value::Object(Map::new())
        };
        let mut form = Self {
            resolver,
            options,
            values: defaults.clone(),
            defaults,
            errors: ValidationErrors::new(),
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            is_dirty: false,
            is_valid: false,
            is_submitted: false,
            is_submit_successful: false,
            submit_count: 0,
            registered: BTreeMap::new(),
            array_ids: BTreeMap::new(),
            listeners: Listeners::default(),
        };
        form.refresh_validity();
        form
    }

    // ─── Registration ────────────────────────────────────────────────

    /// Bind a text input to `name`.
    pub fn register(&mut self, name: &str) -> Result<FieldRegistration, PformError> {
        self.register_with(name, RegisterOptions::default())
    }

    /// Bind an input to `name` with explicit options.
    ///
    /// A field with no value yet starts with the empty value of its input
    /// kind. For top-level fields that value also becomes the default, so
    /// registering never makes the form dirty.
    pub fn register_with(
        &mut self,
        name: &str,
        options: RegisterOptions,
    ) -> Result<FieldRegistration, PformError> {
        let path = FieldPath::parse(name)?;
        if path.get(&self.values).is_none() {
            let empty = options.kind.empty_value();
            path.set(&mut self.values, empty.clone())?;
            if path.len() == 1 && path.get(&self.defaults).is_none() {
                path.set(&mut self.defaults, empty)?;
            }
            self.refresh_validity();
        }
        self.registered.insert(path.clone(), options);
        let value = path.get(&self.values).cloned().unwrap_or(Value::Null);
        debug!(field = %path, "field registered");
        Ok(FieldRegistration {
            name: path,
            options,
            value,
        })
    }

    /// Route an input change for `name`, applying its registration
    /// conversion when it is registered.
    pub fn change(&mut self, name: &str, raw: Value) -> Result<(), PformError> {
        let path = FieldPath::parse(name)?;
        let value = match self.registered.get(&path) {
            Some(options) => options.convert(raw),
            None => raw,
        };
        self.change_path(&path, value)
    }

    /// Route a blur event for `name`.
    pub fn blur(&mut self, name: &str) -> Result<(), PformError> {
        let path = FieldPath::parse(name)?;
        self.blur_path(&path);
        Ok(())
    }

    pub(crate) fn change_path(&mut self, path: &FieldPath, value: Value) -> Result<(), PformError> {
        path.set(&mut self.values, value)?;
        self.regenerate_ids_at(path);
        self.update_dirty(path);
        debug!(field = %path, dirty = self.is_dirty, "value changed");
        self.listeners
            .notify(Some(path), WatchKind::Change, &self.values);

        if self.should_validate(Trigger::Change, path) {
            self.validate_scope(std::slice::from_ref(path));
        } else {
            self.refresh_validity();
        }
        Ok(())
    }

    pub(crate) fn blur_path(&mut self, path: &FieldPath) {
        self.touched.insert(path.clone());
        if self.should_validate(Trigger::Blur, path) {
            self.validate_scope(std::slice::from_ref(path));
        }
    }

    // ─── Values ──────────────────────────────────────────────────────

    /// Imperatively set `name` without dirtying, touching, or validating.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), PformError> {
        self.set_value_with(name, value, SetValueOptions::default())
    }

    /// Imperatively set `name`.
    pub fn set_value_with(
        &mut self,
        name: &str,
        value: Value,
        options: SetValueOptions,
    ) -> Result<(), PformError> {
        let path = FieldPath::parse(name)?;
        path.set(&mut self.values, value)?;
        self.regenerate_ids_at(&path);
        if options.should_dirty {
            self.update_dirty(&path);
        }
        if options.should_touch {
            self.touched.insert(path.clone());
        }
        debug!(field = %path, "value set");
        self.listeners
            .notify(Some(&path), WatchKind::Set, &self.values);

        if options.should_validate {
            self.validate_scope(std::slice::from_ref(&path));
        } else {
            self.refresh_validity();
        }
        Ok(())
    }

    /// The whole value tree.
    pub fn get_values(&self) -> &Value {
        &self.values
    }

    /// Current value at `name`.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        FieldPath::parse(name).ok()?.get(&self.values)
    }

    /// The values a reset returns to.
    pub fn default_values(&self) -> &Value {
        &self.defaults
    }

    // ─── Validation ──────────────────────────────────────────────────

    /// Validate on demand.
    ///
    /// With `None` the whole record is validated and the error map is
    /// replaced. With a list of names only the errors at or below those
    /// paths are refreshed. Returns whether the validated scope is free of
    /// errors.
    pub fn trigger(&mut self, names: Option<&[&str]>) -> Result<bool, PformError> {
        match names {
            None => {
                self.errors = self.resolver.resolve(&self.values).err().unwrap_or_default();
                self.is_valid = self.errors.is_empty();
                debug!(valid = self.is_valid, "validated whole form");
                Ok(self.is_valid)
            }
            Some(names) => {
                let paths = names
                    .iter()
                    .map(|n| FieldPath::parse(n))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.validate_scope(&paths))
            }
        }
    }

    fn should_validate(&self, trigger: Trigger, path: &FieldPath) -> bool {
        if self.is_submitted {
            return match self.options.re_validate_mode {
                ReValidateMode::OnChange => trigger == Trigger::Change,
                ReValidateMode::OnBlur => trigger == Trigger::Blur,
                ReValidateMode::OnSubmit => false,
            };
        }
        match self.options.mode {
            ValidationMode::OnSubmit => false,
            ValidationMode::OnBlur => trigger == Trigger::Blur,
            ValidationMode::OnChange => trigger == Trigger::Change,
            ValidationMode::OnTouched => trigger == Trigger::Blur || self.touched.contains(path),
            ValidationMode::All => true,
        }
    }

    /// Validate the full record, then refresh only the errors at or below
    /// `scopes`.
    pub(crate) fn validate_scope(&mut self, scopes: &[FieldPath]) -> bool {
        let result = self.resolver.resolve(&self.values);
        for scope in scopes {
            self.errors.clear_under(scope);
        }
        let scope_ok = match result {
            Ok(_) => {
                self.is_valid = true;
                true
            }
            Err(all) => {
                self.is_valid = false;
                let scoped = all.scoped_to(scopes);
                let ok = scoped.is_empty();
                self.errors.merge(scoped);
                ok
            }
        };
        debug!(scopes = scopes.len(), valid = scope_ok, "validated fields");
        scope_ok
    }

    /// Validate the full record, then refresh the error at exactly `path`.
    pub(crate) fn validate_exact(&mut self, path: &FieldPath) {
        match self.resolver.resolve(&self.values) {
            Ok(_) => {
                self.is_valid = true;
                self.errors.set(path.clone(), Vec::new());
            }
            Err(all) => {
                self.is_valid = false;
                let own = all.get(path).map(<[String]>::to_vec).unwrap_or_default();
                self.errors.set(path.clone(), own);
            }
        }
    }

    pub(crate) fn refresh_validity(&mut self) {
        self.is_valid = self.resolver.resolve(&self.values).is_ok();
    }

    // ─── Submit & reset ──────────────────────────────────────────────

    /// Validate the whole record and, if it passes, hand the typed record
    /// to `on_valid`.
    pub fn handle_submit(&mut self, on_valid: impl FnOnce(R::Output)) -> SubmitOutcome {
        self.handle_submit_with(on_valid, |_| {})
    }

    /// Like [`handle_submit`](Self::handle_submit), calling `on_invalid`
    /// with the errors when validation fails.
    ///
    /// On success the values return to the defaults (unless
    /// `reset_on_submit` is off) and `is_submit_successful` is set. On
    /// failure the values are kept and the error map is replaced.
    pub fn handle_submit_with(
        &mut self,
        on_valid: impl FnOnce(R::Output),
        on_invalid: impl FnOnce(&ValidationErrors),
    ) -> SubmitOutcome {
        self.submit_count = self.submit_count.saturating_add(1);
        match self.resolver.resolve(&self.values) {
            Ok(output) => {
                self.errors = ValidationErrors::new();
                self.is_valid = true;
                on_valid(output);
                if self.options.reset_on_submit {
                    self.reset_values();
                }
                self.is_submitted = true;
                self.is_submit_successful = true;
                info!(submit_count = self.submit_count, "form submitted");
                SubmitOutcome::Submitted
            }
            Err(errors) => {
                let error_paths = errors.len();
                self.errors = errors;
                self.is_valid = false;
                self.is_submitted = true;
                self.is_submit_successful = false;
                on_invalid(&self.errors);
                info!(
                    submit_count = self.submit_count,
                    error_paths, "submit rejected"
                );
                SubmitOutcome::Invalid { error_paths }
            }
        }
    }

    /// Return to the defaults and clear every flag, error, and counter.
    pub fn reset(&mut self) {
        self.reset_values();
        self.is_submitted = false;
        self.is_submit_successful = false;
        self.submit_count = 0;
        debug!("form reset");
    }

    /// Adopt `defaults` as the new default values, then [`reset`](Self::reset).
    pub fn reset_to(&mut self, defaults: Value) -> Result<(), PformError> {
        if !defaults.is_object() {
            return Err(PformError::InvalidDefaults {
                found: type_name(&defaults).to_string(),
            });
        }
        self.defaults = defaults;
        self.reset();
        Ok(())
    }

    fn reset_values(&mut self) {
        self.values = self.defaults.clone();
        self.errors = ValidationErrors::new();
        self.touched.clear();
        self.dirty.clear();
        self.is_dirty = false;
        self.regenerate_all_ids();
        self.listeners.notify(None, WatchKind::Reset, &self.values);
        self.refresh_validity();
    }

    // ─── Errors ──────────────────────────────────────────────────────

    /// Errors currently shown.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// First error message at exactly `name`.
    pub fn error(&self, name: &str) -> Option<&str> {
        let path = FieldPath::parse(name).ok()?;
        self.errors.first(&path)
    }

    /// Show `message` at `name`, replacing what was there. Marks the form
    /// invalid until the next validation.
    pub fn set_error(&mut self, name: &str, message: impl Into<String>) -> Result<(), PformError> {
        let path = FieldPath::parse(name)?;
        self.errors.set(path, vec![message.into()]);
        self.is_valid = false;
        Ok(())
    }

    /// Clear errors at and below each of `names`, or all errors.
    pub fn clear_errors(&mut self, names: Option<&[&str]>) -> Result<(), PformError> {
        match names {
            None => self.errors = ValidationErrors::new(),
            Some(names) => {
                for name in names {
                    let path = FieldPath::parse(name)?;
                    self.errors.clear_under(&path);
                }
            }
        }
        Ok(())
    }

    // ─── State ───────────────────────────────────────────────────────

    /// Values differ from the defaults.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// The full record passes validation.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// A submit was attempted since the last reset.
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// The last submit attempt passed.
    pub fn is_submit_successful(&self) -> bool {
        self.is_submit_successful
    }

    /// Submit attempts since the last reset.
    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Form configuration.
    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// The resolver validating this form.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Snapshot of the status of `name`.
    pub fn field_state(&self, name: &str) -> Result<FieldState, PformError> {
        let path = FieldPath::parse(name)?;
        Ok(FieldState {
            invalid: self.errors.has_errors_under(&path),
            is_dirty: self.dirty.iter().any(|p| p.starts_with(&path)),
            is_touched: self.touched.iter().any(|p| p.starts_with(&path)),
            error: self.errors.first(&path).map(str::to_string),
        })
    }

    /// Snapshot of the form's status flags.
    pub fn form_state(&self) -> FormState {
        FormState {
            is_dirty: self.is_dirty,
            is_valid: self.is_valid,
            is_submitted: self.is_submitted,
            is_submit_successful: self.is_submit_successful,
            submit_count: self.submit_count,
            dirty_fields: self.dirty.iter().cloned().collect(),
            touched_fields: self.touched.iter().cloned().collect(),
            errors: self.errors.clone(),
        }
    }

    pub(crate) fn update_dirty(&mut self, path: &FieldPath) {
        self.dirty.retain(|p| !p.starts_with(path));
        if path.get(&self.values) != path.get(&self.defaults) {
            self.dirty.insert(path.clone());
        }
        self.is_dirty = self.values != self.defaults;
    }

    // ─── Watching ────────────────────────────────────────────────────

    /// Register a listener for value changes at `name`, or for every
    /// change when `name` is `None`.
    pub fn watch(
        &mut self,
        name: Option<&str>,
        listener: impl FnMut(&WatchEvent<'_>) + 'static,
    ) -> Result<WatchHandle, PformError> {
        let filter = name.map(FieldPath::parse).transpose()?;
        Ok(self.listeners.add(filter, Box::new(listener)))
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unwatch(&mut self, handle: WatchHandle) -> bool {
        self.listeners.remove(handle)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
