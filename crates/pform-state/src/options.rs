//! # Form Configuration
//!
//! `FormOptions` is deserializable (camelCase) so a form can be configured
//! from YAML or JSON:
//!
//! ```yaml
//! mode: onBlur
//! reValidateMode: onChange
//! resetOnSubmit: true
//! defaultValues:
//!   age: 18
//!   gender: m
//!   addresses:
//!     - country: ""
//!       city: ""
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// When fields validate before the first submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Only on submit.
    #[default]
    OnSubmit,
    /// When a field loses focus.
    OnBlur,
    /// On every change.
    OnChange,
    /// On first blur, then on every change of that field.
    OnTouched,
    /// On blur and on change.
    All,
}

/// When fields validate after a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReValidateMode {
    /// On every change.
    #[default]
    OnChange,
    /// When a field loses focus.
    OnBlur,
    /// Only on the next submit.
    OnSubmit,
}

/// Form-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormOptions {
    /// Validation trigger before the first submit attempt.
    pub mode: ValidationMode,
    /// Validation trigger after a submit attempt.
    pub re_validate_mode: ReValidateMode,
    /// Initial values, and the values a reset returns to.
    pub default_values: Value,
    /// Reset to the defaults after a successful submit.
    pub reset_on_submit: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            re_validate_mode: ReValidateMode::default(),
            default_values: Value::Object(serde_json::Map::new()),
            reset_on_submit: true,
        }
    }
}

impl FormOptions {
    /// Options of the person form: validate on blur, age 18, gender `m`,
    /// and one empty address.
    pub fn person() -> Self {
        Self {
            mode: ValidationMode::OnBlur,
            default_values: json!({
                "age": 18,
                "gender": "m",
                "addresses": [{"country": "", "city": ""}]
            }),
            ..Self::default()
        }
    }

    /// Replace the default values.
    pub fn with_defaults(mut self, default_values: Value) -> Self {
        self.default_values = default_values;
        self
    }

    /// Replace the pre-submit validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// The kind of input a field is bound to. Decides the value a field with
/// no default starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Text-like input; starts as `""`.
    #[default]
    Text,
    /// Numeric input; starts as `null`.
    Number,
    /// Checkbox; starts as `false`.
    Checkbox,
    /// Radio group; starts as `null`.
    Radio,
}

impl FieldKind {
    /// Value of an untouched input of this kind.
    pub fn empty_value(self) -> Value {
        match self {
            Self::Text => Value::String(String::new()),
            Self::Checkbox => Value::Bool(false),
            Self::Number | Self::Radio => Value::Null,
        }
    }
}

/// Per-field registration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterOptions {
    /// Input kind.
    pub kind: FieldKind,
    /// Convert textual input to a JSON number before storing it.
    pub value_as_number: bool,
}

impl RegisterOptions {
    /// Options for a numeric input storing numbers.
    pub fn number() -> Self {
        Self {
            kind: FieldKind::Number,
            value_as_number: true,
        }
    }

    /// Options for a checkbox.
    pub fn checkbox() -> Self {
        Self {
            kind: FieldKind::Checkbox,
            value_as_number: false,
        }
    }

    /// Options for a radio group.
    pub fn radio() -> Self {
        Self {
            kind: FieldKind::Radio,
            value_as_number: false,
        }
    }

    /// Apply the input conversion to a raw value.
    ///
    /// With `value_as_number`, strings are parsed as numbers; text that
    /// does not parse (including the empty string) becomes `null`.
    pub fn convert(&self, raw: Value) -> Value {
        if !self.value_as_number {
            return raw;
        }
        match raw {
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
            other => other,
        }
    }
}

/// Options for an imperative `set_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetValueOptions {
    /// Validate the field afterwards.
    pub should_validate: bool,
    /// Update dirty state.
    pub should_dirty: bool,
    /// Mark the field touched.
    pub should_touch: bool,
}
