//! Aggregating reader over raw JSON objects.
//!
//! Model types are built from a [`serde_json::Value`] through [`FromJson`].
//! Failures are recorded in the shared [`Checker`] rather than returned, so
//! one pass reports every problem of a document. A `None` result means the
//! value could not be built and at least one error was recorded for it.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::dialect::{Dialect, ExtraFields};
use crate::error::{FieldPath, ValidationError, ValidationErrorKind, ValidationErrors};
use crate::schema::ObjectSchema;

/// Validation state for one document.
pub(crate) struct Checker {
    dialect: Dialect,
    errors: Vec<ValidationError>,
}

impl Checker {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            errors: Vec::new(),
        }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn report(&mut self, path: &FieldPath, kind: ValidationErrorKind) {
        self.errors.push(ValidationError {
            path: path.clone(),
            kind,
        });
    }

    pub(crate) fn type_mismatch(
        &mut self,
        path: &FieldPath,
        expected: &'static str,
        found: &Value,
    ) {
        self.report(
            path,
            ValidationErrorKind::TypeMismatch {
                expected,
                found: json_type_name(found),
            },
        );
    }

    /// Reports `value < minimum`.
    pub(crate) fn at_least(&mut self, path: &FieldPath, value: f64, minimum: f64) {
        if value < minimum {
            self.report(path, ValidationErrorKind::BelowMinimum { value, minimum });
        }
    }

    /// Converts the collected state into the caller-facing result.
    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationErrors::new(self.errors)),
        }
    }
}

/// JSON type name used in diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Construction from a raw JSON value.
pub(crate) trait FromJson: Sized {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self>;
}

/// A set of object members read and described together.
///
/// Concrete variants are assembled from several groups (common fields, the
/// value kind, the list and flag mixins), each contributing its own members.
pub(crate) trait FieldGroup: Sized {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self>;

    /// Declares the group's members in declaration order.
    fn describe(schema: &mut ObjectSchema<'_>);
}

impl<T: FieldGroup> FromJson for T {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        let mut fields = Fields::open(value, path, cx)?;
        let parsed = T::read(&mut fields);
        fields.finish();
        parsed
    }
}

impl FromJson for String {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                cx.type_mismatch(path, "string", other);
                None
            }
        }
    }
}

impl FromJson for bool {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                cx.type_mismatch(path, "boolean", other);
                None
            }
        }
    }
}

/// The value as an integer, accepting floats with no fractional part (`5.0`).
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

impl FromJson for i64 {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match integral(value) {
            Some(n) => Some(n),
            None => {
                cx.type_mismatch(path, "integer", value);
                None
            }
        }
    }
}

impl FromJson for u64 {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        if let Some(n) = value.as_u64() {
            return Some(n);
        }
        match integral(value) {
            Some(n) if n >= 0 => return Some(n as u64),
            Some(n) => cx.at_least(path, n as f64, 0.0),
            None => cx.type_mismatch(path, "integer", value),
        }
        None
    }
}

impl FromJson for f64 {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                cx.type_mismatch(path, "number", value);
                None
            }
        }
    }
}

impl FromJson for Value {
    fn from_json(value: &Value, _path: &FieldPath, _cx: &mut Checker) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromJson for Map<String, Value> {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.clone()),
            other => {
                cx.type_mismatch(path, "object", other);
                None
            }
        }
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        let Value::Array(items) = value else {
            cx.type_mismatch(path, "array", value);
            return None;
        };
        // Every element is checked even after a failure.
        let parsed: Vec<Option<T>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_json(item, &path.index(index), cx))
            .collect();
        parsed.into_iter().collect()
    }
}

/// Member-by-member access to one JSON object.
///
/// Tracks which members were consumed; [`Fields::finish`] reports the rest
/// when the active dialect forbids undeclared members.
pub(crate) struct Fields<'v, 'c> {
    map: &'v Map<String, Value>,
    path: FieldPath,
    consumed: HashSet<&'static str>,
    cx: &'c mut Checker,
}

impl<'v, 'c> Fields<'v, 'c> {
    /// Opens `value` as an object, reporting a type mismatch otherwise.
    pub(crate) fn open(value: &'v Value, path: &FieldPath, cx: &'c mut Checker) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                map,
                path: path.clone(),
                consumed: HashSet::new(),
                cx,
            }),
            other => {
                cx.type_mismatch(path, "object", other);
                None
            }
        }
    }

    pub(crate) fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Path of one member of this object.
    pub(crate) fn member_path(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }

    pub(crate) fn checker(&mut self) -> &mut Checker {
        self.cx
    }

    /// The unparsed member `key`, left unconsumed.
    pub(crate) fn raw(&self, key: &str) -> Option<&'v Value> {
        self.map.get(key)
    }

    /// A member that must be present.
    pub(crate) fn required<T: FromJson>(&mut self, key: &'static str) -> Option<T> {
        self.consumed.insert(key);
        let path = self.path.key(key);
        match self.map.get(key) {
            Some(value) => T::from_json(value, &path, self.cx),
            None => {
                self.cx.report(&path, ValidationErrorKind::MissingField);
                None
            }
        }
    }

    /// A member that may be absent or `null`.
    ///
    /// The outer `Option` is `None` when a present value failed to parse.
    pub(crate) fn optional<T: FromJson>(&mut self, key: &'static str) -> Option<Option<T>> {
        self.consumed.insert(key);
        match self.map.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(value) => {
                let path = self.path.key(key);
                T::from_json(value, &path, self.cx).map(Some)
            }
        }
    }

    /// A member replaced by `default` when absent.
    pub(crate) fn defaulted<T: FromJson>(&mut self, key: &'static str, default: T) -> Option<T> {
        self.consumed.insert(key);
        match self.map.get(key) {
            None => Some(default),
            Some(value) => {
                let path = self.path.key(key);
                T::from_json(value, &path, self.cx)
            }
        }
    }

    /// An optional array, empty when absent.
    pub(crate) fn list<T: FromJson>(&mut self, key: &'static str) -> Option<Vec<T>> {
        self.optional(key).map(Option::unwrap_or_default)
    }

    /// Reports undeclared members when the dialect forbids them.
    pub(crate) fn finish(self) {
        if self.cx.dialect().extra_fields() == ExtraFields::Ignore {
            return;
        }
        for key in self.map.keys() {
            if !self.consumed.contains(key.as_str()) {
                self.cx
                    .report(&self.path.key(key), ValidationErrorKind::UnknownField);
            }
        }
    }
}
