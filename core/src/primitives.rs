//! Constrained primitive values shared by both dialects.
//!
//! Each primitive validates itself when read from JSON and describes its own
//! JSON Schema fragment, so the validation rule and the exported constraint
//! never drift apart.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{FieldPath, ValidationErrorKind};
use crate::reader::{Checker, FromJson};
use crate::schema::{Definitions, Describe};

/// Identifier pattern for inputs, outputs, groups and sub-commands.
pub const ID_PATTERN: &str = r"^[0-9_a-zA-Z]+$";

/// Value-key pattern of the extended dialect, e.g. `[INPUT_FILE]`.
pub const VALUE_KEY_PATTERN: &str = r"^\[[0-9_A-Z]+\]$";

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ID_PATTERN).expect("static regex must compile"));
static VALUE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VALUE_KEY_PATTERN).expect("static regex must compile"));

macro_rules! constrained_string {
    (
        $(#[$meta:meta])*
        $name:ident $(, pattern = ($pattern:expr, $regex:expr))?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validates `value`, returning the rejection reason on failure.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationErrorKind> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ValidationErrorKind::TooShort { min: 1 });
                }
                $(
                    if !$regex.is_match(&value) {
                        return Err(ValidationErrorKind::PatternMismatch {
                            value,
                            pattern: $pattern,
                        });
                    }
                )?
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromJson for $name {
            fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
                let raw = String::from_json(value, path, cx)?;
                match Self::new(raw) {
                    Ok(parsed) => Some(parsed),
                    Err(kind) => {
                        cx.report(path, kind);
                        None
                    }
                }
            }
        }

        impl Describe for $name {
            fn describe(_defs: &mut Definitions) -> Value {
                #[allow(unused_mut)]
                let mut schema = json!({"type": "string", "minLength": 1});
                $(
                    schema["pattern"] = json!($pattern);
                )?
                schema
            }
        }
    };
}

constrained_string! {
    /// A string of at least one character.
    NonEmptyString
}

constrained_string! {
    /// Alphanumeric identifier (underscores allowed), used to derive
    /// variable names.
    IdString, pattern = (ID_PATTERN, ID_RE)
}

constrained_string! {
    /// Bracketed upper-case placeholder substituted into a command line.
    ValueKeyString, pattern = (VALUE_KEY_PATTERN, VALUE_KEY_RE)
}

/// Absolute `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl(url::Url);

impl HttpUrl {
    pub fn parse(value: &str) -> Result<Self, ValidationErrorKind> {
        let invalid = |reason: String| ValidationErrorKind::InvalidUrl {
            value: value.to_string(),
            reason,
        };
        let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" if parsed.has_host() => Ok(Self(parsed)),
            "http" | "https" => Err(invalid("missing host".to_string())),
            other => Err(invalid(format!("scheme {other:?} is not http or https"))),
        }
    }

    pub fn as_url(&self) -> &url::Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for HttpUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl FromJson for HttpUrl {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        let raw = String::from_json(value, path, cx)?;
        match Self::parse(&raw) {
            Ok(url) => Some(url),
            Err(kind) => {
                cx.report(path, kind);
                None
            }
        }
    }
}

impl Describe for HttpUrl {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({
            "type": "string",
            "format": "uri",
            "minLength": 1,
            "pattern": "^[Hh][Tt][Tt][Pp][Ss]?://",
        })
    }
}

/// Defines a zero-sized marker for a fixed string discriminant.
macro_rules! string_literal {
    ($(#[$meta:meta])* $name:ident => $literal:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            pub const LITERAL: &'static str = $literal;
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($literal)
            }
        }

        impl FromJson for $name {
            fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
                match value {
                    Value::String(s) if s == $literal => Some(Self),
                    other => {
                        cx.report(
                            path,
                            ValidationErrorKind::UnexpectedLiteral {
                                expected: format!("{:?}", $literal),
                                found: other.to_string(),
                            },
                        );
                        None
                    }
                }
            }
        }

        impl Describe for $name {
            fn describe(_defs: &mut Definitions) -> Value {
                json!({"const": $literal})
            }
        }
    };
}

/// Defines a zero-sized marker for a fixed boolean discriminant.
macro_rules! bool_literal {
    ($(#[$meta:meta])* $name:ident => $literal:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            pub const LITERAL: bool = $literal;
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_bool($literal)
            }
        }

        impl FromJson for $name {
            fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
                match value {
                    Value::Bool(b) if *b == $literal => Some(Self),
                    other => {
                        cx.report(
                            path,
                            ValidationErrorKind::UnexpectedLiteral {
                                expected: $literal.to_string(),
                                found: other.to_string(),
                            },
                        );
                        None
                    }
                }
            }
        }

        impl Describe for $name {
            fn describe(_defs: &mut Definitions) -> Value {
                json!({"const": $literal})
            }
        }
    };
}

string_literal!(FlagType => "Flag");
string_literal!(StringType => "String");
string_literal!(FileType => "File");
string_literal!(NumberType => "Number");
string_literal!(
    /// `schema-version` of legacy documents.
    LegacySchemaVersion => "0.5"
);
string_literal!(
    /// `schema-version` of extended documents.
    ExtendedSchemaVersion => "0.5+styx"
);
string_literal!(DockerType => "docker");
string_literal!(RootfsType => "rootfs");

bool_literal!(
    /// `integer: true`, the default for `Number` inputs.
    IntegerMarker => true
);
bool_literal!(
    /// `integer: false`.
    FloatMarker => false
);
bool_literal!(
    /// `list: true`.
    ListMarker => true
);

/// Image-based container runtimes of the legacy dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    Docker,
    Singularity,
}

impl ContainerRuntime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Singularity => "singularity",
        }
    }
}

impl FromJson for ContainerRuntime {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        match value.as_str() {
            Some("docker") => Some(Self::Docker),
            Some("singularity") => Some(Self::Singularity),
            _ => {
                cx.report(
                    path,
                    ValidationErrorKind::UnexpectedLiteral {
                        expected: "\"docker\" or \"singularity\"".to_string(),
                        found: value.to_string(),
                    },
                );
                None
            }
        }
    }
}

impl Describe for ContainerRuntime {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"enum": ["docker", "singularity"]})
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Dialect;

    #[test]
    fn test_id_string_accepts_alphanumerics() {
        assert!(IdString::new("data_file").is_ok());
        assert!(IdString::new("1bad").is_ok());
        assert_eq!(
            IdString::new("bad-id"),
            Err(ValidationErrorKind::PatternMismatch {
                value: "bad-id".into(),
                pattern: ID_PATTERN,
            })
        );
        assert_eq!(IdString::new(""), Err(ValidationErrorKind::TooShort { min: 1 }));
    }

    #[test]
    fn test_value_key_requires_brackets_and_upper_case() {
        assert!(ValueKeyString::new("[INPUT_1]").is_ok());
        assert!(ValueKeyString::new("[input]").is_err());
        assert!(ValueKeyString::new("INPUT").is_err());
        assert!(ValueKeyString::new("[]").is_err());
    }

    #[test]
    fn test_non_empty_string() {
        assert!(NonEmptyString::new("x").is_ok());
        assert!(NonEmptyString::new("").is_err());
    }

    #[test]
    fn test_http_url_schemes() {
        assert!(HttpUrl::parse("https://example.org/image.tar").is_ok());
        assert!(HttpUrl::parse("http://example.org").is_ok());
        assert!(matches!(
            HttpUrl::parse("ftp://example.org"),
            Err(ValidationErrorKind::InvalidUrl { .. })
        ));
        assert!(HttpUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_literals_reject_other_values() {
        let mut cx = Checker::new(Dialect::Boutiques05);
        let path = FieldPath::root().key("type");
        assert!(FlagType::from_json(&json!("Flag"), &path, &mut cx).is_some());
        assert!(FlagType::from_json(&json!("flag"), &path, &mut cx).is_none());
        assert!(IntegerMarker::from_json(&json!(false), &path, &mut cx).is_none());
        assert!(FloatMarker::from_json(&json!(false), &path, &mut cx).is_some());

        let errors = cx.finish(Some(())).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_literals_serialize_as_their_value() {
        assert_eq!(serde_json::to_value(NumberType).unwrap(), json!("Number"));
        assert_eq!(serde_json::to_value(ListMarker).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(IdString::new("x").unwrap()).unwrap(),
            json!("x")
        );
    }

    #[test]
    fn test_describe_attaches_constraints() {
        let mut defs = Definitions::new(Dialect::StyxDescriptor1);
        assert_eq!(
            IdString::describe(&mut defs),
            json!({"type": "string", "minLength": 1, "pattern": ID_PATTERN})
        );
        assert_eq!(FlagType::describe(&mut defs), json!({"const": "Flag"}));
    }
}
