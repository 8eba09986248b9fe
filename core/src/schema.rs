//! JSON Schema projection of the descriptor model.
//!
//! Every model type knows how to describe itself ([`Describe`] for values,
//! [`FieldGroup::describe`] for object members). Named types are hoisted
//! into `$defs` through [`Definitions`], which also breaks the recursion
//! between sub-commands and the inputs that embed them.
//!
//! Key order follows declaration order (`serde_json` is built with
//! `preserve_order`) and `$defs` is sorted by name, so exporting the same
//! dialect twice yields byte-identical documents.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::dialect::{Dialect, ExtraFields, UnknownDialect};
use crate::extended::ExtendedDescriptor;
use crate::legacy::LegacyDescriptor;
use crate::reader::FieldGroup;

/// JSON Schema dialect of exported documents.
pub const JSON_SCHEMA_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// A value whose JSON Schema fragment is known statically.
pub(crate) trait Describe {
    fn describe(defs: &mut Definitions) -> Value;
}

impl Describe for String {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "string"})
    }
}

impl Describe for bool {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "boolean"})
    }
}

impl Describe for i64 {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "integer"})
    }
}

impl Describe for u64 {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "integer", "minimum": 0})
    }
}

impl Describe for f64 {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "number"})
    }
}

impl Describe for Value {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({})
    }
}

impl Describe for Map<String, Value> {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({"type": "object"})
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe(defs: &mut Definitions) -> Value {
        json!({"type": "array", "items": T::describe(defs)})
    }
}

/// Array schema requiring at least one element.
pub(crate) fn non_empty_array<T: Describe>(defs: &mut Definitions) -> Value {
    json!({"type": "array", "items": T::describe(defs), "minItems": 1})
}

/// Named definitions collected while describing one dialect.
pub(crate) struct Definitions {
    dialect: Dialect,
    defs: Map<String, Value>,
}

impl Definitions {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            defs: Map::new(),
        }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns a `$ref` to `name`, building the definition on first use.
    ///
    /// The name is registered before `build` runs so recursive references
    /// resolve to the definition being built.
    pub(crate) fn reference(
        &mut self,
        name: &str,
        build: impl FnOnce(&mut Self) -> Value,
    ) -> Value {
        if !self.defs.contains_key(name) {
            self.defs.insert(name.to_string(), Value::Null);
            let body = build(self);
            self.defs.insert(name.to_string(), body);
        }
        json!({"$ref": format!("#/$defs/{name}")})
    }

    /// Reference to an object definition built from a [`FieldGroup`].
    pub(crate) fn object<T: FieldGroup>(&mut self, name: &'static str, doc: &str) -> Value {
        self.reference(name, |defs| {
            let mut schema = ObjectSchema::new(defs);
            T::describe(&mut schema);
            schema.build(name, doc)
        })
    }

    /// Definitions sorted by name.
    pub(crate) fn into_map(self) -> Map<String, Value> {
        let mut entries: Vec<(String, Value)> = self.defs.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().collect()
    }
}

/// Implements [`Describe`] for a [`FieldGroup`] hoisted into `$defs`.
macro_rules! named_definition {
    ($ty:ident as $name:expr, $doc:expr) => {
        impl $crate::schema::Describe for $ty {
            fn describe(defs: &mut $crate::schema::Definitions) -> serde_json::Value {
                defs.object::<$ty>($name, $doc)
            }
        }
    };
    ($ty:ident, $doc:expr) => {
        $crate::schema::named_definition!($ty as stringify!($ty), $doc);
    };
}
pub(crate) use named_definition;

/// Builder for an object schema, filled member by member.
pub(crate) struct ObjectSchema<'d> {
    defs: &'d mut Definitions,
    properties: Map<String, Value>,
    required: Vec<&'static str>,
    forbidden: Vec<Value>,
}

impl<'d> ObjectSchema<'d> {
    pub(crate) fn new(defs: &'d mut Definitions) -> Self {
        Self {
            defs,
            properties: Map::new(),
            required: Vec::new(),
            forbidden: Vec::new(),
        }
    }

    pub(crate) fn defs(&mut self) -> &mut Definitions {
        self.defs
    }

    pub(crate) fn required<T: Describe>(&mut self, key: &'static str, doc: &str) {
        let schema = T::describe(self.defs);
        self.required_schema(key, schema, doc);
    }

    pub(crate) fn optional<T: Describe>(&mut self, key: &'static str, doc: &str) {
        let schema = T::describe(self.defs);
        self.optional_schema(key, schema, doc);
    }

    /// Member that may be omitted, in which case `default` applies.
    pub(crate) fn defaulted<T: Describe>(&mut self, key: &'static str, default: Value, doc: &str) {
        let mut schema = with_doc(T::describe(self.defs), doc);
        if let Value::Object(map) = &mut schema {
            map.insert("default".to_string(), default);
        }
        self.properties.insert(key.to_string(), schema);
    }

    pub(crate) fn required_schema(&mut self, key: &'static str, schema: Value, doc: &str) {
        self.properties.insert(key.to_string(), with_doc(schema, doc));
        if !self.required.contains(&key) {
            self.required.push(key);
        }
    }

    /// Optional members also accept `null`.
    pub(crate) fn optional_schema(&mut self, key: &'static str, schema: Value, doc: &str) {
        let nullable = json!({
            "anyOf": [schema, {"type": "null"}],
            "default": null,
        });
        self.properties.insert(key.to_string(), with_doc(nullable, doc));
    }

    /// Marks an already declared member as deprecated.
    pub(crate) fn deprecate(&mut self, key: &str) {
        if let Some(Value::Object(member)) = self.properties.get_mut(key) {
            member.insert("deprecated".to_string(), json!(true));
        }
    }

    /// Adds a shape the object must not have.
    pub(crate) fn forbid(&mut self, schema: Value) {
        self.forbidden.push(schema);
    }

    pub(crate) fn build(self, title: &str, doc: &str) -> Value {
        let mut object = Map::new();
        object.insert("title".to_string(), json!(title));
        if !doc.is_empty() {
            object.insert("description".to_string(), json!(doc));
        }
        object.insert("type".to_string(), json!("object"));
        object.insert("properties".to_string(), Value::Object(self.properties));
        if !self.required.is_empty() {
            object.insert("required".to_string(), json!(self.required));
        }
        if self.defs.dialect().extra_fields() == ExtraFields::Forbid {
            object.insert("additionalProperties".to_string(), json!(false));
        }
        let mut forbidden = self.forbidden;
        match forbidden.len() {
            0 => {}
            1 => {
                object.insert("not".to_string(), forbidden.remove(0));
            }
            _ => {
                object.insert("not".to_string(), json!({"anyOf": forbidden}));
            }
        }
        Value::Object(object)
    }
}

fn with_doc(mut schema: Value, doc: &str) -> Value {
    if doc.is_empty() {
        return schema;
    }
    if let Value::Object(map) = &mut schema {
        map.insert("description".to_string(), json!(doc));
    }
    schema
}

/// Exports the JSON Schema of the dialect called `name`.
///
/// # Examples
///
/// ```
/// use boutiques_schema_core::export;
///
/// let schema = export("boutiques-0.5").unwrap();
/// assert_eq!(schema["title"], "Descriptor");
/// assert!(schema["$defs"]["CommandLineFlaggedIntegerListInput"].is_object());
///
/// let err = export("boutiques-9").unwrap_err();
/// assert!(err.to_string().starts_with("unknown schema: boutiques-9"));
/// ```
pub fn export(name: &str) -> Result<Value, UnknownDialect> {
    let dialect: Dialect = name.parse()?;
    Ok(export_dialect(dialect))
}

/// Exports the JSON Schema of `dialect`.
pub fn export_dialect(dialect: Dialect) -> Value {
    debug!(dialect = %dialect, "exporting JSON schema");
    let mut defs = Definitions::new(dialect);
    let root = {
        let mut schema = ObjectSchema::new(&mut defs);
        match dialect {
            Dialect::Boutiques05 => LegacyDescriptor::describe(&mut schema),
            Dialect::StyxDescriptor1 => ExtendedDescriptor::describe(&mut schema),
        }
        schema.build("Descriptor", root_doc(dialect))
    };

    let mut document = Map::new();
    document.insert("$schema".to_string(), json!(JSON_SCHEMA_DRAFT));
    document.insert(
        "$id".to_string(),
        json!(format!("boutiques-schema://{}.json", dialect.name())),
    );
    if let Value::Object(members) = root {
        document.extend(members);
    }
    document.insert("$defs".to_string(), Value::Object(defs.into_map()));
    Value::Object(document)
}

fn root_doc(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Boutiques05 => "Boutiques 0.5 descriptor of a command-line tool.",
        Dialect::StyxDescriptor1 => {
            "Strict Boutiques descriptor of a command-line tool with nested sub-commands."
        }
    }
}
