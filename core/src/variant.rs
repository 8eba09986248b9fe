//! Order-sensitive resolution of variant unions.
//!
//! A union (inputs, outputs, container images) is a static table of
//! [`Variant`]s. Each entry pairs a [`Matcher`] that inspects the raw object's
//! discriminating members with the functions that read and describe the
//! concrete shape. Resolution picks the first matching entry and then reads
//! the whole object with it, so every problem inside the selected variant is
//! reported rather than a bare "no variant matched".
//!
//! Input shapes are the cross product of three axes ([`ValueKind`],
//! [`Cardinality`], [`Prefix`]); the tables list the product explicitly, in
//! priority order.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::dialect::ExtraFields;
use crate::error::{FieldPath, ValidationErrorKind};
use crate::reader::{Checker, FieldGroup, Fields};
use crate::schema::{Definitions, ObjectSchema};

/// What an input's `type` member selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Flag,
    String,
    File,
    /// `Number` with `integer` absent or `true`.
    Integer,
    /// `Number` with `integer: false`.
    Float,
    /// `type` is one sub-command object.
    SubCommand,
    /// `type` is an array of sub-command objects.
    SubCommandUnion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Scalar,
    List,
}

/// Whether a command-line flag precedes the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Bare,
    Flagged,
}

/// One point of the input axis product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    pub prefix: Prefix,
}

impl InputShape {
    pub const fn scalar(kind: ValueKind) -> Self {
        Self {
            kind,
            cardinality: Cardinality::Scalar,
            prefix: Prefix::Bare,
        }
    }

    pub const fn list(kind: ValueKind) -> Self {
        Self {
            kind,
            cardinality: Cardinality::List,
            prefix: Prefix::Bare,
        }
    }

    pub const fn flagged(kind: ValueKind) -> Self {
        Self {
            kind,
            cardinality: Cardinality::Scalar,
            prefix: Prefix::Flagged,
        }
    }

    pub const fn flagged_list(kind: ValueKind) -> Self {
        Self {
            kind,
            cardinality: Cardinality::List,
            prefix: Prefix::Flagged,
        }
    }

    fn matches(&self, object: &Map<String, Value>) -> bool {
        let kind = object.get("type");
        let kind_matches = match self.kind {
            ValueKind::Flag => kind.and_then(Value::as_str) == Some("Flag"),
            ValueKind::String => kind.and_then(Value::as_str) == Some("String"),
            ValueKind::File => kind.and_then(Value::as_str) == Some("File"),
            ValueKind::Integer => {
                kind.and_then(Value::as_str) == Some("Number")
                    && matches!(object.get("integer"), None | Some(Value::Bool(true)))
            }
            ValueKind::Float => {
                kind.and_then(Value::as_str) == Some("Number")
                    && matches!(object.get("integer"), Some(Value::Bool(false) | Value::Null))
            }
            ValueKind::SubCommand => matches!(kind, Some(Value::Object(_))),
            ValueKind::SubCommandUnion => matches!(kind, Some(Value::Array(_))),
        };
        if !kind_matches {
            return false;
        }

        // Flags are never lists and always carry their flag as a plain member.
        if self.kind == ValueKind::Flag {
            return !object.contains_key("list");
        }

        let is_list = object.get("list") == Some(&Value::Bool(true));
        let is_flagged = object.contains_key("command-line-flag");
        (self.cardinality == Cardinality::List) == is_list
            && (self.prefix == Prefix::Flagged) == is_flagged
    }

    /// Shapes a lenient schema must exclude to mirror [`InputShape::matches`].
    fn excluded(&self) -> Vec<Value> {
        if self.kind == ValueKind::Flag {
            return vec![json!({"required": ["list"]})];
        }
        let mut excluded = Vec::new();
        if self.cardinality == Cardinality::Scalar {
            excluded.push(json!({
                "properties": {"list": {"const": true}},
                "required": ["list"],
            }));
        }
        if self.prefix == Prefix::Bare {
            excluded.push(json!({"required": ["command-line-flag"]}));
        }
        excluded
    }
}

/// Decides whether a raw object belongs to a variant.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Input axis discriminants.
    Input(InputShape),
    /// `present` is a member and none of `absent` are.
    Key {
        present: &'static str,
        absent: &'static [&'static str],
    },
    /// `key` holds one of the string `values`.
    Tag {
        key: &'static str,
        values: &'static [&'static str],
    },
}

impl Matcher {
    pub fn matches(&self, object: &Map<String, Value>) -> bool {
        match self {
            Self::Input(shape) => shape.matches(object),
            Self::Key { present, absent } => {
                object.contains_key(*present) && !absent.iter().any(|key| object.contains_key(*key))
            }
            Self::Tag { key, values } => object
                .get(*key)
                .and_then(Value::as_str)
                .is_some_and(|tag| values.contains(&tag)),
        }
    }

    fn excluded(&self) -> Vec<Value> {
        match self {
            Self::Input(shape) => shape.excluded(),
            Self::Key { absent, .. } => absent
                .iter()
                .map(|key| json!({"required": [key]}))
                .collect(),
            Self::Tag { .. } => Vec::new(),
        }
    }
}

/// One concrete shape of a union of `T`.
pub(crate) struct Variant<T> {
    /// Definition name, e.g. `CommandLineFlaggedIntegerListInput`.
    pub name: &'static str,
    pub doc: &'static str,
    pub matcher: Matcher,
    pub read: fn(&mut Fields<'_, '_>) -> Option<T>,
    pub describe: fn(&mut ObjectSchema<'_>),
}

/// Reads the members of `V` and lifts it into its union.
pub(crate) fn read_as<V, T>(fields: &mut Fields<'_, '_>) -> Option<T>
where
    V: FieldGroup + Into<T>,
{
    V::read(fields).map(Into::into)
}

/// Reads `value` with the first variant of `table` that matches it.
pub(crate) fn resolve<T>(
    table: &[Variant<T>],
    family: &'static str,
    value: &Value,
    path: &FieldPath,
    cx: &mut Checker,
) -> Option<T> {
    let Value::Object(object) = value else {
        cx.type_mismatch(path, "object", value);
        return None;
    };
    let Some(variant) = table.iter().find(|variant| variant.matcher.matches(object)) else {
        cx.report(
            path,
            ValidationErrorKind::NoMatchingVariant {
                family,
                tried: table.iter().map(|variant| variant.name).collect(),
            },
        );
        return None;
    };
    debug!(family, variant = variant.name, path = %path, "resolved variant");

    let mut fields = Fields::open(value, path, cx)?;
    let parsed = (variant.read)(&mut fields);
    fields.finish();
    parsed
}

/// `anyOf` over the definitions of `table`, in priority order.
pub(crate) fn describe_union<T>(table: &[Variant<T>], defs: &mut Definitions) -> Value {
    let lenient = defs.dialect().extra_fields() == ExtraFields::Ignore;
    let members: Vec<Value> = table
        .iter()
        .map(|variant| {
            defs.reference(variant.name, |defs| {
                let mut schema = ObjectSchema::new(defs);
                (variant.describe)(&mut schema);
                // Strict objects already reject the members these exclude.
                if lenient {
                    for excluded in variant.matcher.excluded() {
                        schema.forbid(excluded);
                    }
                }
                schema.build(variant.name, variant.doc)
            })
        })
        .collect();
    json!({"anyOf": members})
}

/// Declares a union enum together with its static variant table.
///
/// Entries are listed in priority order as
/// `Variant(ConcreteType) if matcher => "doc"`.
macro_rules! variant_family {
    (
        $(#[$meta:meta])*
        $vis:vis enum $family:ident ($label:literal) in $table:ident {
            $( $variant:ident ( $ty:ident ) if $matcher:expr => $doc:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        #[serde(untagged)]
        $vis enum $family {
            $( $variant($ty), )+
        }

        $(
            impl From<$ty> for $family {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+

        impl $family {
            /// Name of the concrete variant, as used in `$defs`.
            pub fn variant_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => stringify!($ty), )+
                }
            }
        }

        static $table: &[$crate::variant::Variant<$family>] = &[
            $(
                $crate::variant::Variant {
                    name: stringify!($ty),
                    doc: $doc,
                    matcher: $matcher,
                    read: $crate::variant::read_as::<$ty, $family>,
                    describe: <$ty as $crate::reader::FieldGroup>::describe,
                },
            )+
        ];

        impl $crate::reader::FromJson for $family {
            fn from_json(
                value: &serde_json::Value,
                path: &$crate::error::FieldPath,
                cx: &mut $crate::reader::Checker,
            ) -> Option<Self> {
                $crate::variant::resolve($table, $label, value, path, cx)
            }
        }

        impl $crate::schema::Describe for $family {
            fn describe(defs: &mut $crate::schema::Definitions) -> serde_json::Value {
                $crate::variant::describe_union($table, defs)
            }
        }
    };
}
pub(crate) use variant_family;

/// A union of inputs: a [`variant_family!`] whose variants all come from
/// [`input_variant!`], plus accessors over the shared parts.
macro_rules! input_family {
    (
        $(#[$meta:meta])*
        $vis:vis enum $family:ident ($label:literal) in $table:ident {
            base: $base:ty,
            value: $value:ident,
            $( $variant:ident ( $ty:ident ) if $matcher:expr => $doc:literal ),+ $(,)?
        }
    ) => {
        $crate::variant::variant_family! {
            $(#[$meta])*
            $vis enum $family ($label) in $table {
                $( $variant($ty) if $matcher => $doc ),+
            }
        }

        impl $family {
            /// Members shared by every input of the dialect.
            pub fn base(&self) -> &$base {
                match self {
                    $( Self::$variant(input) => &input.base, )+
                }
            }

            /// The kind-specific members.
            pub fn value(&self) -> $value<'_> {
                match self {
                    $( Self::$variant(input) => $value::from(&input.value), )+
                }
            }

            pub fn list_spec(&self) -> Option<&$crate::parts::ListSpec> {
                match self {
                    $( Self::$variant(input) => input.list_spec(), )+
                }
            }

            pub fn command_line_flag(&self) -> Option<&$crate::parts::CommandLineFlag> {
                match self {
                    $( Self::$variant(input) => input.command_line_flag(), )+
                }
            }

            pub fn id(&self) -> &$crate::primitives::IdString {
                &self.base().id
            }
        }
    };
}
pub(crate) use input_family;

macro_rules! part_ref {
    ($part:expr, $ty:ty) => {
        Some($part)
    };
    ($part:expr) => {
        None
    };
}
pub(crate) use part_ref;

/// Declares one concrete input as the composition of its parts.
macro_rules! input_variant {
    (
        $(#[$meta:meta])*
        $name:ident {
            base: $base:ty,
            value: $value:ty
            $(, list: $list:ty)?
            $(, flag: $flag:ty)?
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        pub struct $name {
            #[serde(flatten)]
            pub base: $base,
            #[serde(flatten)]
            pub value: $value,
            $(
                #[serde(flatten)]
                pub list: $list,
            )?
            $(
                #[serde(flatten)]
                pub flag: $flag,
            )?
        }

        impl $crate::reader::FieldGroup for $name {
            fn read(fields: &mut $crate::reader::Fields<'_, '_>) -> Option<Self> {
                let base = <$base as $crate::reader::FieldGroup>::read(fields);
                let value = <$value as $crate::reader::FieldGroup>::read(fields);
                $( let list = <$list as $crate::reader::FieldGroup>::read(fields); )?
                $( let flag = <$flag as $crate::reader::FieldGroup>::read(fields); )?
                Some(Self {
                    base: base?,
                    value: value?,
                    $( list: std::convert::identity::<Option<$list>>(list)?, )?
                    $( flag: std::convert::identity::<Option<$flag>>(flag)?, )?
                })
            }

            fn describe(schema: &mut $crate::schema::ObjectSchema<'_>) {
                <$base as $crate::reader::FieldGroup>::describe(schema);
                <$value as $crate::reader::FieldGroup>::describe(schema);
                $( <$list as $crate::reader::FieldGroup>::describe(schema); )?
                $( <$flag as $crate::reader::FieldGroup>::describe(schema); )?
            }
        }

        impl $name {
            pub fn list_spec(&self) -> Option<&$crate::parts::ListSpec> {
                $crate::variant::part_ref!(&self.list $(, $list)?)
            }

            pub fn command_line_flag(&self) -> Option<&$crate::parts::CommandLineFlag> {
                $crate::variant::part_ref!(&self.flag $(, $flag)?)
            }
        }
    };
}
pub(crate) use input_variant;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    #[test]
    fn test_integer_is_the_default_number() {
        let integer = InputShape::scalar(ValueKind::Integer);
        let float = InputShape::scalar(ValueKind::Float);

        let bare = object(json!({"type": "Number"}));
        assert!(integer.matches(&bare));
        assert!(!float.matches(&bare));

        let explicit = object(json!({"type": "Number", "integer": false}));
        assert!(!integer.matches(&explicit));
        assert!(float.matches(&explicit));
    }

    #[test]
    fn test_flag_never_matches_with_list_key() {
        let flag = InputShape::scalar(ValueKind::Flag);
        assert!(flag.matches(&object(json!({"type": "Flag", "command-line-flag": "-v"}))));
        assert!(!flag.matches(&object(json!({"type": "Flag", "list": false}))));
        assert!(!flag.matches(&object(json!({"type": "Flag", "list": true}))));
    }

    #[test]
    fn test_list_and_flag_axes() {
        let raw = object(json!({"type": "File", "list": true, "command-line-flag": "-i"}));
        assert!(InputShape::flagged_list(ValueKind::File).matches(&raw));
        assert!(!InputShape::list(ValueKind::File).matches(&raw));
        assert!(!InputShape::flagged(ValueKind::File).matches(&raw));
        assert!(!InputShape::scalar(ValueKind::File).matches(&raw));

        let not_a_list = object(json!({"type": "String", "list": false}));
        assert!(InputShape::scalar(ValueKind::String).matches(&not_a_list));
    }

    #[test]
    fn test_sub_command_kinds_follow_json_type() {
        let single = object(json!({"type": {"id": "a"}}));
        let union = object(json!({"type": [{"id": "a"}]}));
        assert!(InputShape::scalar(ValueKind::SubCommand).matches(&single));
        assert!(!InputShape::scalar(ValueKind::SubCommandUnion).matches(&single));
        assert!(InputShape::scalar(ValueKind::SubCommandUnion).matches(&union));
    }

    #[test]
    fn test_key_matcher_is_exclusive() {
        let matcher = Matcher::Key {
            present: "path-template",
            absent: &["conditional-path-template"],
        };
        assert!(matcher.matches(&object(json!({"path-template": "a"}))));
        assert!(!matcher.matches(&object(json!({
            "path-template": "a",
            "conditional-path-template": [],
        }))));
        assert!(!matcher.matches(&object(json!({}))));
    }

    #[test]
    fn test_tag_matcher() {
        let matcher = Matcher::Tag {
            key: "type",
            values: &["docker", "singularity"],
        };
        assert!(matcher.matches(&object(json!({"type": "singularity"}))));
        assert!(!matcher.matches(&object(json!({"type": "rootfs"}))));
        assert!(!matcher.matches(&object(json!({"type": 1}))));
    }
}
