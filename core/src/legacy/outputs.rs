//! Output files of the legacy dialect.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::{Value, json};

use crate::condition::{CONDITION_PATTERN, ConditionExpression};
use crate::error::{FieldPath, ValidationErrorKind};
use crate::parts::{ID_DOC, NAME_DOC, OPTIONAL_DOC, PATH_TEMPLATE_DOC, STRIPPED_EXTENSIONS_DOC};
use crate::primitives::{IdString, NonEmptyString};
use crate::reader::{Checker, FieldGroup, Fields, FromJson};
use crate::schema::{Definitions, Describe, ObjectSchema};
use crate::variant::{Matcher, variant_family};

/// Members common to every legacy output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyOutputBase {
    pub id: IdString,
    pub name: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_template_stripped_extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_template: Option<Vec<NonEmptyString>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_key: Option<String>,
    pub list: bool,
    pub uses_absolute_path: bool,
}

impl FieldGroup for LegacyOutputBase {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.required("name");
        let description = fields.optional("description");
        let optional = fields.defaulted("optional", false);
        let path_template_stripped_extensions =
            fields.optional("path-template-stripped-extensions");
        let file_template = fields.optional("file-template");
        let value_key = fields.optional("value-key");
        let list = fields.defaulted("list", false);
        let uses_absolute_path = fields.defaulted("uses-absolute-path", false);
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            optional: optional?,
            path_template_stripped_extensions: path_template_stripped_extensions?,
            file_template: file_template?,
            value_key: value_key?,
            list: list?,
            uses_absolute_path: uses_absolute_path?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.required::<NonEmptyString>("name", NAME_DOC);
        schema.optional::<String>("description", "");
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
        schema.optional::<Vec<String>>(
            "path-template-stripped-extensions",
            STRIPPED_EXTENSIONS_DOC,
        );
        schema.optional::<Vec<NonEmptyString>>(
            "file-template",
            "An array of strings that may contain value keys. Each item will be a line in the \
             configuration file.",
        );
        schema.optional::<String>(
            "value-key",
            "A string contained in command-line, substituted by the output value and/or flag \
             at runtime.",
        );
        schema.defaulted::<bool>("list", json!(false), "True if output is a list of value.");
        schema.defaulted::<bool>(
            "uses-absolute-path",
            json!(false),
            "Specifies value must be given as an absolute path.",
        );
    }
}

/// Output whose location is one path template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathTemplateOutput {
    #[serde(flatten)]
    pub base: LegacyOutputBase,
    pub path_template: NonEmptyString,
}

impl FieldGroup for PathTemplateOutput {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let base = LegacyOutputBase::read(fields);
        let path_template = fields.required("path-template");
        Some(Self {
            base: base?,
            path_template: path_template?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        LegacyOutputBase::describe(schema);
        schema.required::<NonEmptyString>("path-template", PATH_TEMPLATE_DOC);
    }
}

/// Left-hand side of a conditional path entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCondition {
    /// The `default` key: applies when no earlier condition holds.
    Default,
    When(ConditionExpression),
}

impl PathCondition {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::When(expression) => expression.as_str(),
        }
    }
}

/// One `{condition: path}` entry of a conditional path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalPath {
    pub condition: PathCondition,
    pub path: NonEmptyString,
}

impl Serialize for ConditionalPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.condition.as_str(), &self.path)?;
        map.end()
    }
}

impl FromJson for ConditionalPath {
    fn from_json(value: &Value, path: &FieldPath, cx: &mut Checker) -> Option<Self> {
        let Value::Object(entry) = value else {
            cx.type_mismatch(path, "object", value);
            return None;
        };
        let mut members = entry.iter();
        let (Some((key, target)), None) = (members.next(), members.next()) else {
            cx.report(
                path,
                ValidationErrorKind::ConditionEntryShape { found: entry.len() },
            );
            return None;
        };

        let member_path = path.key(key);
        let condition = if key == "default" {
            Some(PathCondition::Default)
        } else {
            match ConditionExpression::parse(key) {
                Ok(expression) => Some(PathCondition::When(expression)),
                Err(kind) => {
                    cx.report(&member_path, kind);
                    None
                }
            }
        };
        let target = NonEmptyString::from_json(target, &member_path, cx);
        Some(Self {
            condition: condition?,
            path: target?,
        })
    }
}

impl Describe for ConditionalPath {
    fn describe(_defs: &mut Definitions) -> Value {
        json!({
            "type": "object",
            "minProperties": 1,
            "maxProperties": 1,
            "propertyNames": {"pattern": CONDITION_PATTERN},
            "additionalProperties": {"type": "string", "minLength": 1},
        })
    }
}

/// Output whose location depends on the first condition that holds.
///
/// A `default` entry may only appear last, and optional outputs must end
/// with one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConditionalPathTemplateOutput {
    #[serde(flatten)]
    pub base: LegacyOutputBase,
    pub conditional_path_template: Vec<ConditionalPath>,
}

impl FieldGroup for ConditionalPathTemplateOutput {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let base = LegacyOutputBase::read(fields);
        let entries: Option<Vec<ConditionalPath>> = fields.required("conditional-path-template");

        if let Some(entries) = &entries {
            let list_path = fields.member_path("conditional-path-template");
            let cx = fields.checker();
            if entries.is_empty() {
                cx.report(&list_path, ValidationErrorKind::TooShort { min: 1 });
            }
            let last = entries.len().saturating_sub(1);
            for (index, entry) in entries.iter().enumerate() {
                if entry.condition == PathCondition::Default && index != last {
                    cx.report(&list_path.index(index), ValidationErrorKind::MisplacedDefault);
                }
            }
            let ends_with_default = entries
                .last()
                .is_some_and(|entry| entry.condition == PathCondition::Default);
            if base.as_ref().is_some_and(|base| base.optional) && !ends_with_default {
                cx.report(&list_path, ValidationErrorKind::MissingDefaultCondition);
            }
        }

        Some(Self {
            base: base?,
            conditional_path_template: entries?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        LegacyOutputBase::describe(schema);
        let entries = crate::schema::non_empty_array::<ConditionalPath>(schema.defs());
        schema.required_schema(
            "conditional-path-template",
            entries,
            "List of objects containing boolean statement (Limited python syntax: ==, !=, <, >, \
             <=, >=, and, or) and output file paths relative to the execution directory, assign \
             path of first true boolean statement. May contain input value keys, \"default\" \
             object required if \"optional\" set to True. Example list: \
             \"[{\"level > 8\": \"outputs/[INPUT1].txt\"}, {\"default\": \
             \"outputs/default.txt\"}]\".",
        );
    }
}

variant_family! {
    /// A legacy output file: exactly one of `path-template` and
    /// `conditional-path-template`.
    pub enum LegacyOutput ("output") in LEGACY_OUTPUTS {
        PathTemplate(PathTemplateOutput)
            if Matcher::Key { present: "path-template", absent: &["conditional-path-template"] }
            => "Output using a (basic) path template.",
        ConditionalPathTemplate(ConditionalPathTemplateOutput)
            if Matcher::Key { present: "conditional-path-template", absent: &["path-template"] }
            => "Output using a conditional path template.",
    }
}

impl LegacyOutput {
    pub fn base(&self) -> &LegacyOutputBase {
        match self {
            Self::PathTemplate(output) => &output.base,
            Self::ConditionalPathTemplate(output) => &output.base,
        }
    }

    pub fn id(&self) -> &IdString {
        &self.base().id
    }
}
