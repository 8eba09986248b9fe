//! Inputs of the strict extended dialect.
//!
//! On top of the legacy value kinds, an input's `type` may be a whole
//! sub-command (or a non-empty array of alternatives), which makes the input
//! union recursive through [`SubCommand`].

use serde::Serialize;
use serde_json::json;

use super::command::SubCommand;
use crate::error::ValidationErrorKind;
use crate::parts::{
    CommandLineFlag, DEFAULT_VALUE_DOC, FlagValue, ID_DOC, INTEGER_DOC, ListSpec, MAXIMUM_DOC,
    MINIMUM_DOC, OPTIONAL_DOC, StringValue, VALUE_CHOICES_DOC, VALUE_KEY_DOC,
};
use crate::primitives::{
    FileType, FloatMarker, IdString, IntegerMarker, NonEmptyString, NumberType, ValueKeyString,
};
use crate::reader::{FieldGroup, Fields};
use crate::schema::{ObjectSchema, non_empty_array};
use crate::variant::{InputShape, Matcher, ValueKind, input_family, input_variant};

/// Members common to every extended input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedInputBase {
    pub id: IdString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<NonEmptyString>,
    pub value_key: ValueKeyString,
}

impl FieldGroup for ExtendedInputBase {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.optional("name");
        let description = fields.optional("description");
        let value_key = fields.required("value-key");
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            value_key: value_key?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.optional::<NonEmptyString>("name", "A human-readable input name.");
        schema.optional::<NonEmptyString>("description", "Description of the input.");
        schema.required::<ValueKeyString>("value-key", VALUE_KEY_DOC);
    }
}

/// `File` input members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedFileValue {
    #[serde(rename = "type")]
    pub kind: FileType,
    pub mutable: bool,
    pub resolve_parent: bool,
    pub optional: bool,
}

impl FieldGroup for ExtendedFileValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let mutable = fields.defaulted("mutable", false);
        let resolve_parent = fields.defaulted("resolve-parent", false);
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            mutable: mutable?,
            resolve_parent: resolve_parent?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<FileType>("type", "");
        schema.defaulted::<bool>(
            "mutable",
            json!(false),
            "True if the tool modifies the file in place.",
        );
        schema.defaulted::<bool>(
            "resolve-parent",
            json!(false),
            "True if the whole parent directory of the file is made available to the tool.",
        );
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// `Number` input members with `integer` absent or `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedIntegerValue {
    #[serde(rename = "type")]
    pub kind: NumberType,
    pub integer: IntegerMarker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_choices: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<i64>,
    pub optional: bool,
}

impl FieldGroup for ExtendedIntegerValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let integer = fields.defaulted("integer", IntegerMarker);
        let minimum = fields.optional("minimum");
        let maximum = fields.optional("maximum");
        let value_choices = fields.optional("value-choices");
        let default_value = fields.optional("default-value");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            integer: integer?,
            minimum: minimum?,
            maximum: maximum?,
            value_choices: value_choices?,
            default_value: default_value?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NumberType>("type", "");
        schema.defaulted::<IntegerMarker>("integer", json!(true), INTEGER_DOC);
        schema.optional::<i64>("minimum", MINIMUM_DOC);
        schema.optional::<i64>("maximum", MAXIMUM_DOC);
        schema.optional::<Vec<i64>>("value-choices", VALUE_CHOICES_DOC);
        schema.optional::<i64>("default-value", DEFAULT_VALUE_DOC);
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// `Number` input members with `integer: false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedFloatValue {
    #[serde(rename = "type")]
    pub kind: NumberType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer: Option<FloatMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    pub optional: bool,
}

impl FieldGroup for ExtendedFloatValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let integer = fields.optional("integer");
        let minimum = fields.optional("minimum");
        let maximum = fields.optional("maximum");
        let default_value = fields.optional("default-value");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            integer: integer?,
            minimum: minimum?,
            maximum: maximum?,
            default_value: default_value?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NumberType>("type", "");
        schema.optional::<FloatMarker>("integer", INTEGER_DOC);
        schema.optional::<f64>("minimum", MINIMUM_DOC);
        schema.optional::<f64>("maximum", MAXIMUM_DOC);
        schema.optional::<f64>("default-value", DEFAULT_VALUE_DOC);
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// An input whose `type` is a nested command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCommandValue {
    #[serde(rename = "type")]
    pub sub_command: SubCommand,
    pub optional: bool,
}

impl FieldGroup for SubCommandValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let sub_command = fields.required("type");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            sub_command: sub_command?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<SubCommand>("type", "");
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// An input whose `type` is a choice between nested commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCommandUnionValue {
    #[serde(rename = "type")]
    pub alternatives: Vec<SubCommand>,
    pub optional: bool,
}

impl FieldGroup for SubCommandUnionValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let alternatives: Option<Vec<SubCommand>> = fields.required("type");
        if alternatives.as_ref().is_some_and(Vec::is_empty) {
            let path = fields.member_path("type");
            fields
                .checker()
                .report(&path, ValidationErrorKind::TooShort { min: 1 });
        }
        let optional = fields.defaulted("optional", false);
        Some(Self {
            alternatives: alternatives.filter(|alternatives| !alternatives.is_empty())?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        let alternatives = non_empty_array::<SubCommand>(schema.defs());
        schema.required_schema("type", alternatives, "Alternative sub-commands.");
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// Kind-specific members of an extended input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtendedValue<'a> {
    Flag(&'a FlagValue),
    String(&'a StringValue),
    File(&'a ExtendedFileValue),
    Integer(&'a ExtendedIntegerValue),
    Float(&'a ExtendedFloatValue),
    SubCommand(&'a SubCommandValue),
    SubCommandUnion(&'a SubCommandUnionValue),
}

impl<'a> ExtendedValue<'a> {
    /// Sub-commands nested directly in this value.
    pub fn sub_commands(&self) -> &'a [SubCommand] {
        match *self {
            Self::SubCommand(value) => std::slice::from_ref(&value.sub_command),
            Self::SubCommandUnion(value) => &value.alternatives,
            _ => &[],
        }
    }
}

macro_rules! value_from {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for ExtendedValue<'a> {
                fn from(value: &'a $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

value_from! {
    FlagValue => Flag,
    StringValue => String,
    ExtendedFileValue => File,
    ExtendedIntegerValue => Integer,
    ExtendedFloatValue => Float,
    SubCommandValue => SubCommand,
    SubCommandUnionValue => SubCommandUnion,
}

input_variant!(FlagInput { base: ExtendedInputBase, value: FlagValue });
input_variant!(StringInput { base: ExtendedInputBase, value: StringValue });
input_variant!(FileInput { base: ExtendedInputBase, value: ExtendedFileValue });
input_variant!(IntegerInput { base: ExtendedInputBase, value: ExtendedIntegerValue });
input_variant!(FloatInput { base: ExtendedInputBase, value: ExtendedFloatValue });

input_variant!(StringListInput {
    base: ExtendedInputBase,
    value: StringValue,
    list: ListSpec,
});
input_variant!(FileListInput {
    base: ExtendedInputBase,
    value: ExtendedFileValue,
    list: ListSpec,
});
input_variant!(IntegerListInput {
    base: ExtendedInputBase,
    value: ExtendedIntegerValue,
    list: ListSpec,
});
input_variant!(FloatListInput {
    base: ExtendedInputBase,
    value: ExtendedFloatValue,
    list: ListSpec,
});

input_variant!(CommandLineFlaggedStringInput {
    base: ExtendedInputBase,
    value: StringValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFileInput {
    base: ExtendedInputBase,
    value: ExtendedFileValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedIntegerInput {
    base: ExtendedInputBase,
    value: ExtendedIntegerValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFloatInput {
    base: ExtendedInputBase,
    value: ExtendedFloatValue,
    flag: CommandLineFlag,
});

input_variant!(CommandLineFlaggedStringListInput {
    base: ExtendedInputBase,
    value: StringValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFileListInput {
    base: ExtendedInputBase,
    value: ExtendedFileValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedIntegerListInput {
    base: ExtendedInputBase,
    value: ExtendedIntegerValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedFloatListInput {
    base: ExtendedInputBase,
    value: ExtendedFloatValue,
    list: ListSpec,
    flag: CommandLineFlag,
});

input_variant!(SubCommandInput { base: ExtendedInputBase, value: SubCommandValue });
input_variant!(SubCommandUnionInput { base: ExtendedInputBase, value: SubCommandUnionValue });
input_variant!(SubCommandListInput {
    base: ExtendedInputBase,
    value: SubCommandValue,
    list: ListSpec,
});
input_variant!(SubCommandUnionListInput {
    base: ExtendedInputBase,
    value: SubCommandUnionValue,
    list: ListSpec,
});
input_variant!(CommandLineFlaggedSubCommandInput {
    base: ExtendedInputBase,
    value: SubCommandValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedSubCommandListInput {
    base: ExtendedInputBase,
    value: SubCommandValue,
    list: ListSpec,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedSubCommandUnionInput {
    base: ExtendedInputBase,
    value: SubCommandUnionValue,
    flag: CommandLineFlag,
});
input_variant!(CommandLineFlaggedSubCommandUnionListInput {
    base: ExtendedInputBase,
    value: SubCommandUnionValue,
    list: ListSpec,
    flag: CommandLineFlag,
});

input_family! {
    /// An extended input. Variants are tried in declaration order.
    pub enum ExtendedInput ("input") in EXTENDED_INPUTS {
        base: ExtendedInputBase,
        value: ExtendedValue,
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
        SubCommand(SubCommandInput)
            if Matcher::Input(InputShape::scalar(ValueKind::SubCommand)) => "Sub-command.",
        SubCommandUnion(SubCommandUnionInput)
            if Matcher::Input(InputShape::scalar(ValueKind::SubCommandUnion))
            => "Choice between sub-commands.",
        SubCommandList(SubCommandListInput)
            if Matcher::Input(InputShape::list(ValueKind::SubCommand))
            => "Repeated sub-command.",
        SubCommandUnionList(SubCommandUnionListInput)
            if Matcher::Input(InputShape::list(ValueKind::SubCommandUnion))
            => "Repeated choice between sub-commands.",
        FlaggedSubCommand(CommandLineFlaggedSubCommandInput)
            if Matcher::Input(InputShape::flagged(ValueKind::SubCommand))
            => "Sub-command with a command line flag before it.",
        FlaggedSubCommandList(CommandLineFlaggedSubCommandListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::SubCommand))
            => "Repeated sub-command with a command line flag before it.",
        FlaggedSubCommandUnion(CommandLineFlaggedSubCommandUnionInput)
            if Matcher::Input(InputShape::flagged(ValueKind::SubCommandUnion))
            => "Choice between sub-commands with a command line flag before it.",
        FlaggedSubCommandUnionList(CommandLineFlaggedSubCommandUnionListInput)
            if Matcher::Input(InputShape::flagged_list(ValueKind::SubCommandUnion))
            => "Repeated choice between sub-commands with a command line flag before it.",
    }
}
