//! # Shape Rules
//!
//! A small declarative language for describing record shapes. Each [`Node`]
//! checks one value, reports failures into a [`ValidationErrors`] at the
//! current path, and hands back the coerced value for the typed record.
//!
//! ```text
//! ObjectShape
//!   ├── "age"       NumberRule   coerce, min 18
//!   ├── "email"     StringRule   min 1, email
//!   └── "addresses" ArrayRule    min 1
//!                     └── ObjectShape { "country", "city" }
//! ```
//!
//! Objects and arrays visit every child even after a failure, so one pass
//! reports every broken field. Within a single string field the checks run
//! in declaration order and stop at the first failure. Object members the
//! shape does not declare are dropped from the output.

use pform_core::FieldPath;
use serde_json::{Map, Number, Value};

use crate::email::is_valid_email;
use crate::errors::ValidationErrors;

const REQUIRED: &str = "Required";

/// Result of checking one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    /// The value passed; carries the coerced output.
    Valid(Value),
    /// An optional value was not supplied.
    Absent,
    /// The value failed; messages were reported.
    Invalid,
}

/// JSON type name used in type-mismatch messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, value: &Value) -> String {
    format!("Expected {what}, received {}", type_name(value))
}

/// One declarative rule.
#[derive(Debug, Clone)]
pub enum Node {
    /// Text field.
    String(StringRule),
    /// Numeric field, optionally coerced from other JSON types.
    Number(NumberRule),
    /// Boolean field.
    Boolean(BooleanRule),
    /// One of a fixed set of strings.
    Enum(EnumRule),
    /// Homogeneous list.
    Array(ArrayRule),
    /// Nested object.
    Object(ObjectShape),
}

impl Node {
    /// Check `value` (`None` when the member is missing) at `path`.
    pub fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        match self {
            Self::String(rule) => rule.check(value, path, errors),
            Self::Number(rule) => rule.check(value, path, errors),
            Self::Boolean(rule) => rule.check(value, path, errors),
            Self::Enum(rule) => rule.check(value, path, errors),
            Self::Array(rule) => rule.check(value, path, errors),
            Self::Object(shape) => shape.check(value, path, errors),
        }
    }
}

// ─── Strings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum StringCheck {
    MinLength(usize, &'static str),
    Email(&'static str),
}

/// Rule for text fields.
#[derive(Debug, Clone, Default)]
pub struct StringRule {
    optional: bool,
    checks: Vec<StringCheck>,
}

impl StringRule {
    /// A required string with no further checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a missing or `null` value.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Require at least `len` characters.
    pub fn min(mut self, len: usize, message: &'static str) -> Self {
        self.checks.push(StringCheck::MinLength(len, message));
        self
    }

    /// Require a syntactically valid email address.
    pub fn email(mut self, message: &'static str) -> Self {
        self.checks.push(StringCheck::Email(message));
        self
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        let s = match value {
            None | Some(Value::Null) if self.optional => return Checked::Absent,
            None => {
                errors.add(path.clone(), REQUIRED);
                return Checked::Invalid;
            }
            Some(Value::String(s)) => s,
            Some(other) => {
                errors.add(path.clone(), expected("string", other));
                return Checked::Invalid;
            }
        };

        for check in &self.checks {
            let failed = match check {
                StringCheck::MinLength(len, message) => {
                    (s.chars().count() < *len).then_some(*message)
                }
                StringCheck::Email(message) => (!is_valid_email(s)).then_some(*message),
            };
            if let Some(message) = failed {
                errors.add(path.clone(), message);
                return Checked::Invalid;
            }
        }
        Checked::Valid(Value::String(s.clone()))
    }
}

impl From<StringRule> for Node {
    fn from(rule: StringRule) -> Self {
        Self::String(rule)
    }
}

// ─── Numbers ─────────────────────────────────────────────────────────

/// Rule for numeric fields.
#[derive(Debug, Clone, Default)]
pub struct NumberRule {
    coerce: bool,
    type_message: Option<&'static str>,
    min: Option<(f64, &'static str)>,
}

impl NumberRule {
    /// A number that must already be a JSON number.
    pub fn new() -> Self {
        Self::default()
    }

    /// A number coerced from strings, booleans, and `null` first.
    pub fn coerced() -> Self {
        Self {
            coerce: true,
            ..Self::default()
        }
    }

    /// Message reported when the value is not (and cannot become) a number.
    pub fn type_message(mut self, message: &'static str) -> Self {
        self.type_message = Some(message);
        self
    }

    /// Require a value of at least `min`.
    pub fn min(mut self, min: f64, message: &'static str) -> Self {
        self.min = Some((min, message));
        self
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        let number = if self.coerce {
            coerce_number(value)
        } else {
            value.and_then(Value::as_f64)
        };

        let Some(n) = number.filter(|n| n.is_finite()) else {
            let message = match (self.type_message, value) {
                (Some(m), _) => m.to_string(),
                (None, None) => REQUIRED.to_string(),
                (None, Some(v)) => expected("number", v),
            };
            errors.add(path.clone(), message);
            return Checked::Invalid;
        };

        if let Some((min, message)) = self.min {
            if n < min {
                errors.add(path.clone(), message);
                return Checked::Invalid;
            }
        }

        match Number::from_f64(n) {
            Some(num) => Checked::Valid(Value::Number(num)),
            None => {
                errors.add(path.clone(), expected("number", &Value::Null));
                Checked::Invalid
            }
        }
    }
}

/// Coerce a raw form value to a number.
///
/// Numbers pass through; strings are trimmed and parsed, with the empty
/// string reading as zero; booleans read as 1 and 0; `null` reads as zero.
/// Missing values, arrays, and objects have no numeric reading.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                Some(0.0)
            } else {
                t.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<NumberRule> for Node {
    fn from(rule: NumberRule) -> Self {
        Self::Number(rule)
    }
}

// ─── Booleans ────────────────────────────────────────────────────────

/// Rule for boolean fields.
#[derive(Debug, Clone, Default)]
pub struct BooleanRule {
    must_be_true: Option<&'static str>,
}

impl BooleanRule {
    /// Any boolean.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only the literal `true`; every other value reports `message`.
    pub fn must_be_true(mut self, message: &'static str) -> Self {
        self.must_be_true = Some(message);
        self
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        match (value, self.must_be_true) {
            (Some(Value::Bool(true)), _) => Checked::Valid(Value::Bool(true)),
            (_, Some(message)) => {
                errors.add(path.clone(), message);
                Checked::Invalid
            }
            (Some(Value::Bool(b)), None) => Checked::Valid(Value::Bool(*b)),
            (None, None) => {
                errors.add(path.clone(), REQUIRED);
                Checked::Invalid
            }
            (Some(other), None) => {
                errors.add(path.clone(), expected("boolean", other));
                Checked::Invalid
            }
        }
    }
}

impl From<BooleanRule> for Node {
    fn from(rule: BooleanRule) -> Self {
        Self::Boolean(rule)
    }
}

// ─── Enums ───────────────────────────────────────────────────────────

/// Rule for a closed set of string values.
#[derive(Debug, Clone)]
pub struct EnumRule {
    variants: Vec<&'static str>,
}

impl EnumRule {
    /// Accept exactly one of `variants`.
    pub fn new(variants: &[&'static str]) -> Self {
        Self {
            variants: variants.to_vec(),
        }
    }

    fn expected_list(&self) -> String {
        self.variants
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        match value {
            None => {
                errors.add(path.clone(), REQUIRED);
                Checked::Invalid
            }
            Some(Value::String(s)) if self.variants.iter().any(|v| *v == s.as_str()) => {
                Checked::Valid(Value::String(s.clone()))
            }
            Some(Value::String(s)) => {
                errors.add(
                    path.clone(),
                    format!(
                        "Invalid enum value. Expected {}, received '{s}'",
                        self.expected_list()
                    ),
                );
                Checked::Invalid
            }
            Some(other) => {
                errors.add(path.clone(), expected(&self.expected_list(), other));
                Checked::Invalid
            }
        }
    }
}

impl From<EnumRule> for Node {
    fn from(rule: EnumRule) -> Self {
        Self::Enum(rule)
    }
}

// ─── Arrays ──────────────────────────────────────────────────────────

/// Rule for lists whose entries share one rule.
#[derive(Debug, Clone)]
pub struct ArrayRule {
    item: Box<Node>,
    min: Option<(usize, &'static str)>,
}

impl ArrayRule {
    /// A list whose entries each satisfy `item`.
    pub fn new(item: impl Into<Node>) -> Self {
        Self {
            item: Box::new(item.into()),
            min: None,
        }
    }

    /// Require at least `len` entries.
    pub fn min(mut self, len: usize, message: &'static str) -> Self {
        self.min = Some((len, message));
        self
    }

    fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        let items = match value {
            None => {
                errors.add(path.clone(), REQUIRED);
                return Checked::Invalid;
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                errors.add(path.clone(), expected("array", other));
                return Checked::Invalid;
            }
        };

        let mut ok = true;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            path.push_index(i);
            match self.item.check(Some(item), path, errors) {
                Checked::Valid(v) => out.push(v),
                Checked::Absent => out.push(Value::Null),
                Checked::Invalid => ok = false,
            }
            path.pop();
        }

        if let Some((min, message)) = self.min {
            if items.len() < min {
                errors.add(path.clone(), message);
                ok = false;
            }
        }

        if ok {
            Checked::Valid(Value::Array(out))
        } else {
            Checked::Invalid
        }
    }
}

impl From<ArrayRule> for Node {
    fn from(rule: ArrayRule) -> Self {
        Self::Array(rule)
    }
}

// ─── Objects ─────────────────────────────────────────────────────────

/// Rule for objects with a fixed set of members.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    fields: Vec<(&'static str, Node)>,
}

impl ObjectShape {
    /// An object with no declared members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare member `name` checked by `rule`.
    pub fn field(mut self, name: &'static str, rule: impl Into<Node>) -> Self {
        self.fields.push((name, rule.into()));
        self
    }

    /// Declared member names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Check `value` at `path`.
    pub fn check(
        &self,
        value: Option<&Value>,
        path: &mut FieldPath,
        errors: &mut ValidationErrors,
    ) -> Checked {
        let members = match value {
            None => {
                errors.add(path.clone(), REQUIRED);
                return Checked::Invalid;
            }
            Some(Value::Object(members)) => members,
            Some(other) => {
                errors.add(path.clone(), expected("object", other));
                return Checked::Invalid;
            }
        };

        let mut ok = true;
        let mut out = Map::new();
        for (name, rule) in &self.fields {
            path.push_key(*name);
            match rule.check(members.get(*name), path, errors) {
                Checked::Valid(v) => {
                    out.insert((*name).to_string(), v);
                }
                Checked::Absent => {}
                Checked::Invalid => ok = false,
            }
            path.pop();
        }

        if ok {
            Checked::Valid(Value::Object(out))
        } else {
            Checked::Invalid
        }
    }
}

impl From<ObjectShape> for Node {
    fn from(shape: ObjectShape) -> Self {
        Self::Object(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(node: impl Into<Node>, value: Option<Value>) -> (Checked, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let mut path = FieldPath::parse("field").unwrap();
        let checked = node.into().check(value.as_ref(), &mut path, &mut errors);
        (checked, errors)
    }

    fn first(errors: &ValidationErrors, path: &str) -> Option<String> {
        errors
            .first(&FieldPath::parse(path).unwrap())
            .map(str::to_string)
    }

    #[test]
    fn test_string_checks_stop_at_first_failure() {
        let rule = StringRule::new().min(1, "empty").email("bad email");
        let (checked, errors) = run(rule.clone(), Some(json!("")));
        assert_eq!(checked, Checked::Invalid);
        assert_eq!(errors.get(&FieldPath::parse("field").unwrap()).unwrap().len(), 1);
        assert_eq!(first(&errors, "field").as_deref(), Some("empty"));

        let (_, errors) = run(rule, Some(json!("nope")));
        assert_eq!(first(&errors, "field").as_deref(), Some("bad email"));
    }

    #[test]
    fn test_optional_string_accepts_missing_and_null() {
        assert_eq!(run(StringRule::new().optional(), None).0, Checked::Absent);
        assert_eq!(run(StringRule::new().optional(), Some(Value::Null)).0, Checked::Absent);
        let (checked, errors) = run(StringRule::new().optional(), Some(json!(5)));
        assert_eq!(checked, Checked::Invalid);
        assert_eq!(
            first(&errors, "field").as_deref(),
            Some("Expected string, received number")
        );
    }

    #[test]
    fn test_required_string_missing() {
        let (_, errors) = run(StringRule::new(), None);
        assert_eq!(first(&errors, "field").as_deref(), Some("Required"));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerce_number(Some(&json!(" 21 "))), Some(21.0));
        assert_eq!(coerce_number(Some(&json!(""))), Some(0.0));
        assert_eq!(coerce_number(Some(&json!(true))), Some(1.0));
        assert_eq!(coerce_number(Some(&Value::Null)), Some(0.0));
        assert_eq!(coerce_number(Some(&json!("abc"))), None);
        assert_eq!(coerce_number(Some(&json!([1]))), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn test_number_rule_outputs_coerced_value() {
        let rule = NumberRule::coerced().min(18.0, "too young");
        assert_eq!(run(rule.clone(), Some(json!("30"))).0, Checked::Valid(json!(30.0)));
        let (_, errors) = run(rule, Some(json!("12")));
        assert_eq!(first(&errors, "field").as_deref(), Some("too young"));
    }

    #[test]
    fn test_number_rule_rejects_non_finite() {
        let rule = NumberRule::coerced().type_message("not a number");
        let (_, errors) = run(rule.clone(), Some(json!("inf")));
        assert_eq!(first(&errors, "field").as_deref(), Some("not a number"));
        let (_, errors) = run(rule, Some(json!("NaN")));
        assert_eq!(first(&errors, "field").as_deref(), Some("not a number"));
    }

    #[test]
    fn test_uncoerced_number_rejects_strings() {
        let (_, errors) = run(NumberRule::new(), Some(json!("18")));
        assert_eq!(
            first(&errors, "field").as_deref(),
            Some("Expected number, received string")
        );
    }

    #[test]
    fn test_boolean_must_be_true() {
        let rule = BooleanRule::new().must_be_true("accept");
        assert_eq!(run(rule.clone(), Some(json!(true))).0, Checked::Valid(json!(true)));
        for v in [json!(false), json!("true"), json!(1), Value::Null] {
            let (_, errors) = run(rule.clone(), Some(v));
            assert_eq!(first(&errors, "field").as_deref(), Some("accept"));
        }
        let (_, errors) = run(rule, None);
        assert_eq!(first(&errors, "field").as_deref(), Some("accept"));
    }

    #[test]
    fn test_enum_messages() {
        let rule = EnumRule::new(&["m", "f"]);
        assert_eq!(run(rule.clone(), Some(json!("f"))).0, Checked::Valid(json!("f")));
        let (_, errors) = run(rule.clone(), Some(json!("x")));
        assert_eq!(
            first(&errors, "field").as_deref(),
            Some("Invalid enum value. Expected 'm' | 'f', received 'x'")
        );
        let (_, errors) = run(rule, Some(json!(3)));
        assert_eq!(
            first(&errors, "field").as_deref(),
            Some("Expected 'm' | 'f', received number")
        );
    }

    #[test]
    fn test_array_reports_indexed_paths() {
        let item = ObjectShape::new().field("country", StringRule::new().min(1, "country"));
        let rule = ArrayRule::new(item).min(1, "at least one");
        let (checked, errors) = run(
            rule.clone(),
            Some(json!([{"country": "US"}, {"country": ""}, {"country": ""}])),
        );
        assert_eq!(checked, Checked::Invalid);
        assert_eq!(errors.len(), 2);
        assert_eq!(first(&errors, "field.1.country").as_deref(), Some("country"));
        assert_eq!(first(&errors, "field.2.country").as_deref(), Some("country"));

        let (_, errors) = run(rule, Some(json!([])));
        assert_eq!(errors.len(), 1);
        assert_eq!(first(&errors, "field").as_deref(), Some("at least one"));
    }

    #[test]
    fn test_object_strips_unknown_members_and_collects_all() {
        let shape = ObjectShape::new()
            .field("a", StringRule::new())
            .field("b", NumberRule::new())
            .field("c", StringRule::new().optional());
        let (checked, _) = run(shape.clone(), Some(json!({"a": "x", "b": 1, "extra": true})));
        assert_eq!(checked, Checked::Valid(json!({"a": "x", "b": 1.0})));

        let (_, errors) = run(shape, Some(json!({"b": "no"})));
        assert_eq!(errors.len(), 2);
        assert_eq!(first(&errors, "field.a").as_deref(), Some("Required"));
    }
}
