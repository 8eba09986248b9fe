//! Validation error types.
//!
//! Every problem found while validating a descriptor is recorded as a
//! [`ValidationError`]: a [`FieldPath`] locating the offending value inside
//! the document plus a [`ValidationErrorKind`] describing what did not
//! conform. Validation keeps going after the first failure, so callers get
//! every problem of a document at once through [`ValidationErrors`].
//!
//! # Examples
//!
//! ```
//! use boutiques_schema_core::{Dialect, ValidationErrorKind, validate_descriptor};
//! use serde_json::json;
//!
//! let document = json!({
//!     "name": "tool",
//!     "command-line": "tool [IN]",
//!     "schema-version": "0.5+styx",
//!     "inputs": [{"id": "bad-id", "type": "String", "value-key": "[IN]"}]
//! });
//! let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.as_slice()[0].path.to_string(), "$.inputs[0].id");
//! assert!(matches!(
//!     errors.as_slice()[0].kind,
//!     ValidationErrorKind::PatternMismatch { .. }
//! ));
//! ```

use std::fmt;

use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member, by wire name (e.g. `value-key`).
    Key(String),
    /// Array element, by position.
    Index(usize),
}

/// Location of a value inside a descriptor document.
///
/// Rendered with a `$` root, dotted member names and bracketed indices:
/// `$.inputs[2].type.inputs[0].id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a path extended by an object member.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// Returns a path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns `true` for the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// What went wrong at a given path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    /// A mandatory field is absent.
    #[error("missing required field")]
    MissingField,
    /// A field the active dialect does not declare (extended dialect only).
    #[error("unknown field is not allowed in this dialect")]
    UnknownField,
    /// The JSON value has the wrong type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected JSON type.
        expected: &'static str,
        /// JSON type actually present.
        found: &'static str,
    },
    /// A string fails its attached regular expression.
    #[error("{value:?} does not match pattern {pattern}")]
    PatternMismatch {
        /// The offending string.
        value: String,
        /// The pattern it had to match.
        pattern: &'static str,
    },
    /// A string or array is shorter than allowed.
    #[error("must contain at least {min} element(s) or character(s)")]
    TooShort {
        /// Minimum length.
        min: usize,
    },
    /// A fixed discriminant holds a different value.
    #[error("expected {expected}, found {found}")]
    UnexpectedLiteral {
        /// The literal the field must hold.
        expected: String,
        /// The value present in the document.
        found: String,
    },
    /// A number is below its lower bound.
    #[error("{value} is below the minimum of {minimum}")]
    BelowMinimum {
        /// The offending number.
        value: f64,
        /// Inclusive lower bound.
        minimum: f64,
    },
    /// A string is not an absolute http(s) URL.
    #[error("invalid URL {value:?}: {reason}")]
    InvalidUrl {
        /// The offending string.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// A conditional path expression does not parse.
    #[error("invalid condition {expression:?}: {reason}")]
    InvalidCondition {
        /// The expression as written.
        expression: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// An object matches none of the concrete shapes of its union.
    #[error("{family} matches none of its variants (tried {})", .tried.join(", "))]
    NoMatchingVariant {
        /// Union family, e.g. `input`.
        family: &'static str,
        /// Variant names in the order they were tried.
        tried: Vec<&'static str>,
    },
    /// A conditional path entry is not a single-key object.
    #[error("expected exactly one condition/path pair, found {found}")]
    ConditionEntryShape {
        /// Number of members present.
        found: usize,
    },
    /// A `default` conditional path entry that is not the last one.
    #[error("the \"default\" entry must be the last conditional path")]
    MisplacedDefault,
    /// An optional output whose conditional paths have no fallback.
    #[error("optional outputs need a terminal \"default\" conditional path")]
    MissingDefaultCondition,
    /// An identifier used twice in the same scope.
    #[error("duplicate id {0:?}")]
    DuplicateId(String),
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    /// Where the failure occurred.
    pub path: FieldPath,
    /// What did not conform.
    pub kind: ValidationErrorKind,
}

/// Every failure found in one document, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// The failures as a slice.
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Failures recorded exactly at `path` (as rendered by [`FieldPath`]).
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |e| e.path.to_string() == path)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "descriptor is invalid ({} error(s))", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure to load a descriptor from raw text.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The text is not JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON does not conform to the dialect.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::root()
            .key("inputs")
            .index(2)
            .key("type")
            .key("value-key");
        assert_eq!(path.to_string(), "$.inputs[2].type.value-key");
        assert_eq!(FieldPath::root().to_string(), "$");
        assert!(FieldPath::root().is_root());
    }

    #[test]
    fn test_errors_display_lists_every_failure() {
        let errors = ValidationErrors::new(vec![
            ValidationError {
                path: FieldPath::root().key("name"),
                kind: ValidationErrorKind::MissingField,
            },
            ValidationError {
                path: FieldPath::root().key("inputs").index(0).key("id"),
                kind: ValidationErrorKind::DuplicateId("x".into()),
            },
        ]);

        let rendered = errors.to_string();
        assert!(rendered.contains("2 error(s)"));
        assert!(rendered.contains("$.name: missing required field"));
        assert!(rendered.contains("$.inputs[0].id: duplicate id \"x\""));
        assert_eq!(errors.at("$.name").count(), 1);
    }

    #[test]
    fn test_no_matching_variant_message() {
        let kind = ValidationErrorKind::NoMatchingVariant {
            family: "input",
            tried: vec!["IntegerInput", "FloatInput"],
        };
        assert_eq!(
            kind.to_string(),
            "input matches none of its variants (tried IntegerInput, FloatInput)"
        );
    }
}
