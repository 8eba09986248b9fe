//! Inputs of the legacy dialect.

use serde::Serialize;
use serde_json::{Value, json};

use crate::parts::{
    CommandLineFlag, DEFAULT_VALUE_DOC, FlagValue, ID_DOC, INTEGER_DOC, ListSpec, MAXIMUM_DOC,
    MINIMUM_DOC, NAME_DOC, OPTIONAL_DOC, StringValue, VALUE_CHOICES_DOC, VALUE_KEY_DOC,
};
use crate::primitives::{FileType, FloatMarker, IdString, IntegerMarker, NonEmptyString, NumberType};
use crate::reader::{FieldGroup, Fields};
use crate::schema::ObjectSchema;
use crate::variant::{InputShape, Matcher, ValueKind, input_family, input_variant};

const EXCLUSIVE_MINIMUM_DOC: &str =
    "Specify whether the minimum is exclusive or not. May only be used with Number type inputs.";
const EXCLUSIVE_MAXIMUM_DOC: &str =
    "Specify whether the maximum is exclusive or not. May only be used with Number type inputs.";

/// Members common to every legacy input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyInputBase {
    pub id: IdString,
    pub name: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Placeholder substituted into the command line; free-form here.
    pub value_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_inputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disables_inputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_requires: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_enables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_disables: Option<Value>,
}

impl FieldGroup for LegacyInputBase {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.required("name");
        let description = fields.optional("description");
        let value_key = fields.required("value-key");
        let requires_inputs = fields.optional("requires-inputs");
        let disables_inputs = fields.optional("disables-inputs");
        let value_requires = fields.optional("value-requires");
        let value_enables = fields.optional("value-enables");
        let value_disables = fields.optional("value-disables");
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            value_key: value_key?,
            requires_inputs: requires_inputs?,
            disables_inputs: disables_inputs?,
            value_requires: value_requires?,
            value_enables: value_enables?,
            value_disables: value_disables?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.required::<NonEmptyString>("name", NAME_DOC);
        schema.optional::<String>("description", "");
        schema.required::<String>("value-key", VALUE_KEY_DOC);
        schema.optional::<Vec<String>>(
            "requires-inputs",
            "Ids of the inputs or ids of groups whose members must be active for this input \
             to be available.",
        );
        schema.optional::<Vec<String>>(
            "disables-inputs",
            "Ids of the inputs that are disabled when this input is active.",
        );
        schema.optional::<Value>(
            "value-requires",
            "Ids of the inputs that are required when the corresponding value choice is selected.",
        );
        schema.optional::<Value>(
            "value-enables",
            "Ids of the inputs that are enabled when the corresponding value choice is selected.",
        );
        schema.optional::<Value>(
            "value-disables",
            "Ids of the inputs that are disabled when the corresponding value choice is selected.",
        );
        for key in ["value-requires", "value-enables", "value-disables"] {
            schema.deprecate(key);
        }
    }
}

/// `File` input members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyFileValue {
    #[serde(rename = "type")]
    pub kind: FileType,
    pub uses_absolute_path: bool,
    pub optional: bool,
}

impl FieldGroup for LegacyFileValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let uses_absolute_path = fields.defaulted("uses-absolute-path", false);
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            uses_absolute_path: uses_absolute_path?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<FileType>("type", "");
        schema.defaulted::<bool>(
            "uses-absolute-path",
            json!(false),
            "Specifies value must be given as an absolute path.",
        );
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// `Number` input members with `integer` absent or `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyIntegerValue {
    #[serde(rename = "type")]
    pub kind: NumberType,
    pub integer: IntegerMarker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_choices: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<i64>,
    pub optional: bool,
}

impl FieldGroup for LegacyIntegerValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let integer = fields.defaulted("integer", IntegerMarker);
        let minimum = fields.optional("minimum");
        let maximum = fields.optional("maximum");
        let exclusive_minimum = fields.defaulted("exclusive-minimum", false);
        let exclusive_maximum = fields.defaulted("exclusive-maximum", false);
        let value_choices = fields.optional("value-choices");
        let default_value = fields.optional("default-value");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            integer: integer?,
            minimum: minimum?,
            maximum: maximum?,
            exclusive_minimum: exclusive_minimum?,
            exclusive_maximum: exclusive_maximum?,
            value_choices: value_choices?,
            default_value: default_value?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NumberType>("type", "");
        schema.defaulted::<IntegerMarker>("integer", json!(true), INTEGER_DOC);
        describe_bounds(schema);
        schema.optional::<Vec<i64>>("value-choices", VALUE_CHOICES_DOC);
        schema.optional::<i64>("default-value", DEFAULT_VALUE_DOC);
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// `Number` input members with `integer: false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyFloatValue {
    #[serde(rename = "type")]
    pub kind: NumberType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer: Option<FloatMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_choices: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    pub optional: bool,
}

impl FieldGroup for LegacyFloatValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let integer = fields.optional("integer");
        let minimum = fields.optional("minimum");
        let maximum = fields.optional("maximum");
        let exclusive_minimum = fields.defaulted("exclusive-minimum", false);
        let exclusive_maximum = fields.defaulted("exclusive-maximum", false);
        let value_choices = fields.optional("value-choices");
        let default_value = fields.optional("default-value");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            integer: integer?,
            minimum: minimum?,
            maximum: maximum?,
            exclusive_minimum: exclusive_minimum?,
            exclusive_maximum: exclusive_maximum?,
            value_choices: value_choices?,
            default_value: default_value?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NumberType>("type", "");
        schema.optional::<FloatMarker>("integer", INTEGER_DOC);
        describe_bounds(schema);
        schema.optional::<Vec<f64>>("value-choices", VALUE_CHOICES_DOC);
        schema.optional::<f64>("default-value", DEFAULT_VALUE_DOC);
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

fn describe_bounds(schema: &mut ObjectSchema<'_>) {
    schema.optional::<f64>("minimum", MINIMUM_DOC);
    schema.optional::<f64>("maximum", MAXIMUM_DOC);
    schema.defaulted::<bool>("exclusive-minimum", json!(false), EXCLUSIVE_MINIMUM_DOC);
    schema.defaulted::<bool>("exclusive-maximum", json!(false), EXCLUSIVE_MAXIMUM_DOC);
}

/// Kind-specific members of a legacy input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegacyValue<'a> {
    Flag(&'a FlagValue),
    String(&'a StringValue),
    File(&'a LegacyFileValue),
    Integer(&'a LegacyIntegerValue),
    Float(&'a LegacyFloatValue),
}

impl<'a> From<&'a FlagValue> for LegacyValue<'a> {
    fn from(value: &'a FlagValue) -> Self {
        Self::Flag(value)
    }
}

impl<'a> From<&'a StringValue> for LegacyValue<'a> {
    fn from(value: &'a StringValue) -> Self {
        Self::String(value)
    }
}

impl<'a> From<&'a LegacyFileValue> for LegacyValue<'a> {
    fn from(value: &'a LegacyFileValue) -> Self {
        Self::File(value)
    }
}

impl<'a> From<&'a LegacyIntegerValue> for LegacyValue<'a> {
    fn from(value: &'a LegacyIntegerValue) -> Self {
        Self::Integer(value)
    }
}

impl<'a> From<&'a LegacyFloatValue> for LegacyValue<'a> {
    fn from(value: &'a LegacyFloatValue) -> Self {
        Self::Float(value)
    }
}

input_variant!(FlagInput { base: LegacyInputBase, value: FlagValue });
input_variant!(StringInput { base: LegacyInputBase, value: StringValue });
input_variant!(FileInput { base: LegacyInputBase, value: LegacyFileValue });
input_variant!(IntegerInput { base: LegacyInputBase, value: LegacyIntegerValue });
input_variant!(FloatInput { base: LegacyInputBase, value: LegacyFloatValue });

input_variant!(StringListInput {
    base: LegacyInputBase,
    value: StringValue,
    list: ListSpec,
});
input_variant!(FileListInput {
    base: LegacyInputBase,
    value: LegacyFileValue,
    list: ListSpec,
});
input_variant!(IntegerListInput {
    base: LegacyInputBase,
    value: LegacyIntegerValue,
    list: ListSpec,
});
input_variant!(FloatListInput {
    base: LegacyInputBase,
    value: LegacyFloatValue,
    list: ListSpec,
});

input_variant!(CommandLineFlaggedStringInput {
    base: LegacyInputBase,
    value: StringValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFileInput {
    base: LegacyInputBase,
    value: LegacyFileValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedIntegerInput {
    base: LegacyInputBase,
    value: LegacyIntegerValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFloatInput {
    base: LegacyInputBase,
    value: LegacyFloatValue,
    flag: CommandLineFlag,
});

input_variant!(CommandLineFlaggedStringListInput {
    base: LegacyInputBase,
    value: StringValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFileListInput {
    base: LegacyInputBase,
    value: LegacyFileValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedIntegerListInput {
    base: LegacyInputBase,
    value: LegacyIntegerValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFloatListInput {
    base: LegacyInputBase,
    value: LegacyFloatValue,
    list: ListSpec,
    flag: CommandLineFlag,
});

input_family! {
    /// A legacy input. Variants are tried in declaration order.
    pub enum LegacyInput ("input") in LEGACY_INPUTS {
        base: LegacyInputBase,
        value: LegacyValue,
        Flag(FlagInput)
            if Matcher::Input(InputShape::scalar(ValueKind::Flag)) => "Flag input.",
        String(StringInput)
            if Matcher::Input(InputShape::scalar(ValueKind::String)) => "String input.",
        File(FileInput)
            if Matcher::Input(InputShape::scalar(ValueKind::File)) => "File input.",
        Integer(IntegerInput)
            if Matcher::Input(InputShape::scalar(ValueKind::Integer)) => "Integer input.",
        Float(FloatInput)
            if Matcher::Input(InputShape::scalar(ValueKind::Float)) => "Float input.",
        StringList(StringListInput)
            if Matcher::Input(InputShape::list(ValueKind::String)) => "List of strings.",
        FileList(FileListInput)
            if Matcher::Input(InputShape::list(ValueKind::File)) => "List of files.",
        IntegerList(IntegerListInput)
            if Matcher::Input(InputShape::list(ValueKind::Integer)) => "List of integers.",
        FloatList(FloatListInput)
            if Matcher::Input(InputShape::list(ValueKind::Float)) => "List of floats.",
        FlaggedString(CommandLineFlaggedStringInput)
            if Matcher::Input(InputShape::flagged(ValueKind::String))
            => "String with a command line flag before it.",
        FlaggedFile(CommandLineFlaggedFileInput)
            if Matcher::Input(InputShape::flagged(ValueKind::File))
            => "File with a command line flag before it.",
        FlaggedInteger(CommandLineFlaggedIntegerInput)
            if Matcher::Input(InputShape::flagged(ValueKind::Integer))
            => "Integer with a command line flag before it.",
        FlaggedFloat(CommandLineFlaggedFloatInput)
            if Matcher::Input(InputShape::flagged(ValueKind::Float))
            => "Float with a command line flag before it.",
        FlaggedStringList(CommandLineFlaggedStringListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::String))
            => "List of strings with a command line flag before them.",
        FlaggedFileList(CommandLineFlaggedFileListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::File))
            => "List of files with a command line flag before them.",
        FlaggedIntegerList(CommandLineFlaggedIntegerListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::Integer))
            => "List of integers with a command line flag before them.",
        FlaggedFloatList(CommandLineFlaggedFloatListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::Float))
            => "List of floats with a command line flag before them.",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Dialect;
    use crate::error::{FieldPath, ValidationErrorKind};
    use crate::reader::{Checker, FromJson};

    fn resolve(value: Value) -> (Option<LegacyInput>, Checker) {
        let mut cx = Checker::new(Dialect::Boutiques05);
        let input = LegacyInput::from_json(&value, &FieldPath::root(), &mut cx);
        (input, cx)
    }

    fn variant(value: Value) -> &'static str {
        let (input, cx) = resolve(value);
        cx.finish(input).unwrap().variant_name()
    }

    fn base() -> Value {
        json!({"id": "x", "name": "X", "value-key": "[X]"})
    }

    fn with(extra: Value) -> Value {
        let mut value = base();
        for (key, member) in extra.as_object().unwrap() {
            value[key] = member.clone();
        }
        value
    }

    #[test]
    fn test_number_defaults_to_integer() {
        assert_eq!(variant(with(json!({"type": "Number"}))), "IntegerInput");
        assert_eq!(
            variant(with(json!({"type": "Number", "integer": false}))),
            "FloatInput"
        );
    }

    #[test]
    fn test_full_axis_product() {
        assert_eq!(
            variant(with(json!({
                "type": "Number",
                "integer": true,
                "list": true,
                "command-line-flag": "-n",
            }))),
            "CommandLineFlaggedIntegerListInput"
        );
        assert_eq!(
            variant(with(json!({"type": "String", "list": true}))),
            "StringListInput"
        );
        assert_eq!(
            variant(with(json!({"type": "File", "command-line-flag": "-i"}))),
            "CommandLineFlaggedFileInput"
        );
    }

    #[test]
    fn test_accessors_reach_every_part() {
        let (input, cx) = resolve(with(json!({
            "type": "Number",
            "integer": false,
            "list": true,
            "min-list-entries": 1,
            "command-line-flag": "-f",
            "minimum": 0.5,
        })));
        let input = cx.finish(input).unwrap();
        assert_eq!(input.id().as_str(), "x");
        assert_eq!(input.list_spec().and_then(|l| l.min_list_entries), Some(1));
        assert_eq!(
            input.command_line_flag().map(|f| f.command_line_flag.as_str()),
            Some("-f")
        );
        let LegacyValue::Float(value) = input.value() else {
            panic!("expected a float input");
        };
        assert_eq!(value.minimum, Some(0.5));
    }

    #[test]
    fn test_flag_with_list_matches_nothing() {
        let (input, cx) = resolve(with(json!({
            "type": "Flag",
            "command-line-flag": "-v",
            "list": false,
        })));
        let errors = cx.finish(input).unwrap_err();
        assert_eq!(errors.len(), 1);
        let ValidationErrorKind::NoMatchingVariant { family, tried } = &errors.as_slice()[0].kind
        else {
            panic!("expected a resolution error");
        };
        assert_eq!(*family, "input");
        assert_eq!(tried.len(), 17);
        assert_eq!(tried[0], "FlagInput");
    }

    #[test]
    fn test_unknown_members_are_ignored() {
        assert_eq!(
            variant(with(json!({"type": "String", "list": false, "x-editor": 1}))),
            "StringInput"
        );
    }

    #[test]
    fn test_selected_variant_reports_every_field() {
        let (input, cx) = resolve(json!({
            "id": "bad id",
            "type": "Number",
            "value-key": "[N]",
            "default-value": 1.5,
        }));
        let errors = cx.finish(input).unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["$.id", "$.name", "$.default-value"]);
    }
}
