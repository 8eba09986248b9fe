//! Member groups shared by both dialects.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{FieldPath, ValidationErrorKind};
use crate::primitives::{FlagType, ListMarker, NonEmptyString, StringType};
use crate::reader::{Checker, FieldGroup, Fields};
use crate::schema::{ObjectSchema, named_definition};

pub(crate) const ID_DOC: &str = "A short, unique, informative identifier containing only \
    alphanumeric characters and underscores. Typically used to generate variable names. \
    Example: \"data_file\".";
pub(crate) const NAME_DOC: &str = "A human-readable name. Example: 'Data file'.";
pub(crate) const VALUE_KEY_DOC: &str =
    "A string contained in command-line, substituted by the input value and/or flag at runtime.";
pub(crate) const OPTIONAL_DOC: &str = "True if optional";
pub(crate) const VALUE_CHOICES_DOC: &str =
    "Permitted choices for input value. May not be used with the Flag type.";
pub(crate) const DEFAULT_VALUE_DOC: &str = "Default value of the input. The default value is \
    set when no value is specified, even when the input is optional. If the desired behavior \
    is to omit the input from the command line when no value is specified, then no default \
    value should be used. In this case, the tool might still use a default value internally, \
    but this will remain undocumented in the Boutiques interface.";
pub(crate) const INTEGER_DOC: &str =
    "Specify whether the input should be an integer. May only be used with Number type inputs.";
pub(crate) const MINIMUM_DOC: &str = "Specify the minimum value of the input (inclusive). \
    May only be used with Number type inputs.";
pub(crate) const MAXIMUM_DOC: &str = "Specify the maximum value of the input (inclusive). \
    May only be used with Number type inputs.";
pub(crate) const COMMAND_LINE_FLAG_DOC: &str = "Option flag, involved in the value-key \
    substitution. Inputs of type \"Flag\" have to have a command-line flag. Examples: -v, --force.";
pub(crate) const COMMAND_LINE_DOC: &str = "A string that describes the tool command line, \
    where input and output values are identified by \"keys\". At runtime, command-line keys \
    are substituted with flags and values.";
pub(crate) const PATH_TEMPLATE_DOC: &str = "Describes the output file path relatively to the \
    execution directory. May contain input value keys and wildcards. Example: \
    \"results/[INPUT1]_brain*.mnc\".";
pub(crate) const STRIPPED_EXTENSIONS_DOC: &str = "List of file extensions that will be stripped \
    from the input values before being substituted in the path template. Example: \
    [\".nii\",\".nii.gz\"].";

/// Members of list-valued inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListSpec {
    pub list: ListMarker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_list_entries: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_list_entries: Option<u64>,
}

impl FieldGroup for ListSpec {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let list = fields.required("list");
        let list_separator = fields.optional("list-separator");
        let min_list_entries = fields.optional("min-list-entries");
        let max_list_entries = fields.optional("max-list-entries");
        Some(Self {
            list: list?,
            list_separator: list_separator?,
            min_list_entries: min_list_entries?,
            max_list_entries: max_list_entries?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<ListMarker>(
            "list",
            "True if list of values. If value is of type \"Flag\" cannot be a list.",
        );
        schema.optional::<String>(
            "list-separator",
            "Separator used between list items. Defaults to a single space.",
        );
        schema.optional::<u64>(
            "min-list-entries",
            "Specify the minimum number of entries in the list. \
             May only be used with List type inputs.",
        );
        schema.optional::<u64>(
            "max-list-entries",
            "Specify the maximum number of entries in the list. \
             May only be used with List type inputs.",
        );
    }
}

/// Members of inputs preceded by a command-line flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandLineFlag {
    pub command_line_flag: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_line_flag_separator: Option<String>,
}

impl FieldGroup for CommandLineFlag {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let command_line_flag = fields.required("command-line-flag");
        let command_line_flag_separator = fields.optional("command-line-flag-separator");
        Some(Self {
            command_line_flag: command_line_flag?,
            command_line_flag_separator: command_line_flag_separator?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("command-line-flag", COMMAND_LINE_FLAG_DOC);
        schema.optional::<String>(
            "command-line-flag-separator",
            "Separator used between flags and their arguments. Defaults to a single space.",
        );
    }
}

/// `String` input members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StringValue {
    #[serde(rename = "type")]
    pub kind: StringType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_choices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub optional: bool,
}

impl FieldGroup for StringValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let value_choices = fields.optional("value-choices");
        let default_value = fields.optional("default-value");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            value_choices: value_choices?,
            default_value: default_value?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<StringType>("type", "");
        schema.optional::<Vec<String>>("value-choices", VALUE_CHOICES_DOC);
        schema.optional::<String>("default-value", DEFAULT_VALUE_DOC);
        schema.defaulted::<bool>("optional", json!(false), OPTIONAL_DOC);
    }
}

/// `Flag` input members.
///
/// `optional` is accepted for compatibility but has no meaning: a flag is
/// either passed or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagValue {
    #[serde(rename = "type")]
    pub kind: FlagType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,
    pub command_line_flag: NonEmptyString,
    pub optional: bool,
}

impl FieldGroup for FlagValue {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let default_value = fields.optional("default-value");
        let command_line_flag = fields.required("command-line-flag");
        let optional = fields.defaulted("optional", false);
        Some(Self {
            kind: kind?,
            default_value: default_value?,
            command_line_flag: command_line_flag?,
            optional: optional?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<FlagType>("type", "");
        schema.optional::<bool>("default-value", DEFAULT_VALUE_DOC);
        schema.required::<NonEmptyString>("command-line-flag", COMMAND_LINE_FLAG_DOC);
        schema.defaulted::<bool>(
            "optional",
            json!(false),
            "Optional has no meaning for Flag type inputs",
        );
        schema.deprecate("optional");
    }
}

/// Computational resources suggested for running the tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedResources {
    /// Requested number of CPU cores (at least 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u64>,
    /// Requested RAM in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<f64>,
    /// Requested storage in GB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_space: Option<f64>,
    /// Number of nodes to spread the tool across (at least 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u64>,
    /// Estimated wall time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walltime_estimate: Option<f64>,
}

impl SuggestedResources {
    fn bounds() -> [(&'static str, f64); 5] {
        [
            ("cpu-cores", 1.0),
            ("ram", 0.0),
            ("disk-space", 0.0),
            ("nodes", 1.0),
            ("walltime-estimate", 0.0),
        ]
    }
}

impl FieldGroup for SuggestedResources {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let cpu_cores: Option<Option<u64>> = fields.optional("cpu-cores");
        let ram: Option<Option<f64>> = fields.optional("ram");
        let disk_space: Option<Option<f64>> = fields.optional("disk-space");
        let nodes: Option<Option<u64>> = fields.optional("nodes");
        let walltime_estimate: Option<Option<f64>> = fields.optional("walltime-estimate");

        let values = [
            cpu_cores.flatten().map(|n| n as f64),
            ram.flatten(),
            disk_space.flatten(),
            nodes.flatten().map(|n| n as f64),
            walltime_estimate.flatten(),
        ];
        let mut in_bounds = true;
        for ((key, minimum), value) in Self::bounds().into_iter().zip(values) {
            if let Some(value) = value.filter(|value| *value < minimum) {
                let path = fields.member_path(key);
                fields.checker().at_least(&path, value, minimum);
                in_bounds = false;
            }
        }

        let resources = Self {
            cpu_cores: cpu_cores?,
            ram: ram?,
            disk_space: disk_space?,
            nodes: nodes?,
            walltime_estimate: walltime_estimate?,
        };
        in_bounds.then_some(resources)
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        let docs = [
            "The requested number of cpu cores to run the described application",
            "The requested number of GB RAM to run the described application",
            "The requested number of GB of storage to run the described application",
            "The requested number of nodes to spread the described application across",
            "Estimated wall time of a task in seconds.",
        ];
        for ((key, minimum), doc) in Self::bounds().into_iter().zip(docs) {
            let kind = if matches!(key, "cpu-cores" | "nodes") {
                "integer"
            } else {
                "number"
            };
            let bound = if kind == "integer" {
                json!(minimum as u64)
            } else {
                json!(minimum)
            };
            schema.optional_schema(key, json!({"type": kind, "minimum": bound}), doc);
        }
    }
}

named_definition!(
    SuggestedResources,
    "Suggested computational resources for running the tool."
);

/// Container members common to every image kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_hash: Option<NonEmptyString>,
    pub entrypoint: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_opts: Option<Vec<String>>,
}

impl FieldGroup for ContainerOptions {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let working_directory = fields.optional("working-directory");
        let container_hash = fields.optional("container-hash");
        let entrypoint = fields.defaulted("entrypoint", false);
        let index = fields.optional("index");
        let container_opts = fields.optional("container-opts");
        Some(Self {
            working_directory: working_directory?,
            container_hash: container_hash?,
            entrypoint: entrypoint?,
            index: index?,
            container_opts: container_opts?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.optional::<String>(
            "working-directory",
            "Location from which this task must be launched within the container.",
        );
        schema.optional::<NonEmptyString>("container-hash", "Hash for the given container.");
        schema.defaulted::<bool>(
            "entrypoint",
            json!(false),
            "Flag indicating whether or not the container uses an entrypoint.",
        );
        schema.optional::<NonEmptyString>(
            "index",
            "Optional index where the image is available, if not the standard location. \
             Example: docker.io",
        );
        schema.optional::<Vec<String>>(
            "container-opts",
            "Container-level arguments for the application. Example: --privileged",
        );
    }
}

/// Identifiers claimed within one scope.
#[derive(Debug, Default)]
pub(crate) struct IdScope<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> IdScope<'a> {
    /// Claims `id`, reporting a duplicate at `path`.
    pub(crate) fn claim(&mut self, id: &'a str, path: &FieldPath, cx: &mut Checker) {
        if !self.seen.insert(id) {
            cx.report(path, ValidationErrorKind::DuplicateId(id.to_string()));
        }
    }

    /// Claims the raw `id` of every element of the array member `key`.
    ///
    /// Works on the unparsed JSON, so an element that failed validation
    /// still takes part and cannot hide a duplicate among its siblings.
    pub(crate) fn claim_each(&mut self, fields: &mut Fields<'a, '_>, key: &str) {
        let Some(Value::Array(items)) = fields.raw(key) else {
            return;
        };
        let list = fields.member_path(key);
        for (index, item) in items.iter().enumerate() {
            if let Some(id) = raw_id(item) {
                self.claim(id, &list.index(index).key("id"), fields.checker());
            }
        }
    }

    /// Claims the raw `id` of the object member `key`.
    pub(crate) fn claim_one(&mut self, fields: &mut Fields<'a, '_>, key: &str) {
        if let Some(id) = fields.raw(key).and_then(raw_id) {
            let path = fields.member_path(key).key("id");
            self.claim(id, &path, fields.checker());
        }
    }
}

fn raw_id(value: &Value) -> Option<&str> {
    value.get("id")?.as_str()
}
