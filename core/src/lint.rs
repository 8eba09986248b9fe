//! Advisory checks on descriptors that already validated.
//!
//! These relations are not part of either dialect, so they never make a
//! descriptor invalid; they point at likely authoring mistakes.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::descriptor::Descriptor;
use crate::error::FieldPath;
use crate::extended::{CommandBody, ExtendedValue};
use crate::legacy::{LegacyDescriptor, LegacyOutput, LegacyValue, PathCondition};
use crate::parts::{ListSpec, StringValue};

/// One advisory finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub path: FieldPath,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Runs every advisory check over `descriptor`.
///
/// # Examples
///
/// ```
/// use boutiques_schema_core::{Dialect, lint_descriptor, validate_descriptor};
/// use serde_json::json;
///
/// let document = json!({
///     "name": "tool",
///     "command-line": "tool",
///     "schema-version": "0.5",
///     "inputs": [{"id": "a", "name": "A", "type": "String", "value-key": "[A]"}]
/// });
/// let descriptor = validate_descriptor(&document, Dialect::Boutiques05).unwrap();
/// let warnings = lint_descriptor(&descriptor);
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].path.to_string(), "$.inputs[0].value-key");
/// ```
pub fn lint_descriptor(descriptor: &Descriptor) -> Vec<LintWarning> {
    let mut lint = Lint::default();
    match descriptor {
        Descriptor::Legacy(descriptor) => lint.legacy(descriptor),
        Descriptor::Extended(descriptor) => lint.command(&descriptor.body, &FieldPath::root()),
    }
    debug!(warnings = lint.warnings.len(), "lint finished");
    lint.warnings
}

#[derive(Default)]
struct Lint {
    warnings: Vec<LintWarning>,
}

impl Lint {
    fn warn(&mut self, path: FieldPath, message: impl Into<String>) {
        self.warnings.push(LintWarning {
            path,
            message: message.into(),
        });
    }

    fn legacy(&mut self, descriptor: &LegacyDescriptor) {
        let root = FieldPath::root();
        let command_line = descriptor.command_line.as_str();
        let input_ids: HashSet<&str> =
            descriptor.inputs.iter().map(|input| input.id().as_str()).collect();
        let group_ids: HashSet<&str> =
            descriptor.groups.iter().map(|group| group.id.as_str()).collect();

        for (index, input) in descriptor.inputs.iter().enumerate() {
            let path = root.key("inputs").index(index);
            self.value_key(&input.base().value_key, command_line, &path);
            if let Some(list) = input.list_spec() {
                self.list_bounds(list, &path);
            }
            match input.value() {
                LegacyValue::String(value) => self.string_default(value, &path),
                LegacyValue::Integer(value) => {
                    self.bounds(value.minimum, value.maximum, &path);
                    self.default_in_choices(
                        value.default_value,
                        value.value_choices.as_deref(),
                        &path,
                    );
                }
                LegacyValue::Float(value) => {
                    self.bounds(value.minimum, value.maximum, &path);
                    self.default_in_choices(
                        value.default_value,
                        value.value_choices.as_deref(),
                        &path,
                    );
                }
                LegacyValue::Flag(_) | LegacyValue::File(_) => {}
            }

            let base = input.base();
            for (key, ids) in [
                ("requires-inputs", &base.requires_inputs),
                ("disables-inputs", &base.disables_inputs),
            ] {
                for (position, id) in ids.iter().flatten().enumerate() {
                    if !input_ids.contains(id.as_str()) && !group_ids.contains(id.as_str()) {
                        self.warn(
                            path.key(key).index(position),
                            format!("references unknown input or group `{id}`"),
                        );
                    }
                }
            }
        }

        for (index, group) in descriptor.groups.iter().enumerate() {
            for (position, member) in group.members.iter().enumerate() {
                if !input_ids.contains(member.as_str()) {
                    self.warn(
                        root.key("groups").index(index).key("members").index(position),
                        format!("references unknown input `{member}`"),
                    );
                }
            }
        }

        for (index, output) in descriptor.output_files.iter().enumerate() {
            let LegacyOutput::ConditionalPathTemplate(output) = output else {
                continue;
            };
            let path = root.key("output-files").index(index).key("conditional-path-template");
            for (position, entry) in output.conditional_path_template.iter().enumerate() {
                let PathCondition::When(expression) = &entry.condition else {
                    continue;
                };
                for identifier in expression.identifiers() {
                    if !input_ids.contains(identifier) {
                        self.warn(
                            path.index(position).key(expression.as_str()),
                            format!("condition refers to unknown input `{identifier}`"),
                        );
                    }
                }
            }
        }
    }

    fn command(&mut self, body: &CommandBody, path: &FieldPath) {
        let command_line = body.command_line.as_str();
        for (index, input) in body.inputs().iter().enumerate() {
            let input_path = path.key("inputs").index(index);
            self.value_key(input.base().value_key.as_str(), command_line, &input_path);
            if let Some(list) = input.list_spec() {
                self.list_bounds(list, &input_path);
            }
            let value = input.value();
            match value {
                ExtendedValue::String(value) => self.string_default(value, &input_path),
                ExtendedValue::Integer(value) => {
                    self.bounds(value.minimum, value.maximum, &input_path);
                    self.default_in_choices(
                        value.default_value,
                        value.value_choices.as_deref(),
                        &input_path,
                    );
                }
                ExtendedValue::Float(value) => {
                    self.bounds(value.minimum, value.maximum, &input_path);
                }
                ExtendedValue::SubCommand(value) => {
                    self.command(&value.sub_command.body, &input_path.key("type"));
                }
                ExtendedValue::SubCommandUnion(value) => {
                    for (position, alternative) in value.alternatives.iter().enumerate() {
                        self.command(&alternative.body, &input_path.key("type").index(position));
                    }
                }
                ExtendedValue::Flag(_) | ExtendedValue::File(_) => {}
            }
        }
    }

    fn value_key(&mut self, value_key: &str, command_line: &str, path: &FieldPath) {
        if !value_key.is_empty() && !command_line.contains(value_key) {
            self.warn(
                path.key("value-key"),
                format!("value-key `{value_key}` does not appear in the command line"),
            );
        }
    }

    fn bounds<T: PartialOrd + fmt::Display>(
        &mut self,
        minimum: Option<T>,
        maximum: Option<T>,
        path: &FieldPath,
    ) {
        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            if minimum > maximum {
                self.warn(
                    path.key("minimum"),
                    format!("minimum {minimum} is greater than maximum {maximum}"),
                );
            }
        }
    }

    fn list_bounds(&mut self, list: &ListSpec, path: &FieldPath) {
        if let (Some(min), Some(max)) = (list.min_list_entries, list.max_list_entries) {
            if min > max {
                self.warn(
                    path.key("min-list-entries"),
                    format!("min-list-entries {min} is greater than max-list-entries {max}"),
                );
            }
        }
    }

    fn string_default(&mut self, value: &StringValue, path: &FieldPath) {
        let choices: Option<Vec<&str>> = value
            .value_choices
            .as_ref()
            .map(|choices| choices.iter().map(String::as_str).collect());
        self.default_in_choices(value.default_value.as_deref(), choices.as_deref(), path);
    }

    fn default_in_choices<T: PartialEq + fmt::Display>(
        &mut self,
        default: Option<T>,
        choices: Option<&[T]>,
        path: &FieldPath,
    ) {
        if let (Some(default), Some(choices)) = (default, choices) {
            if !choices.contains(&default) {
                self.warn(
                    path.key("default-value"),
                    format!("default value {default} is not one of the value choices"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::Dialect;
    use crate::descriptor::validate_descriptor;

    fn lint(document: Value, dialect: Dialect) -> Vec<String> {
        let descriptor = validate_descriptor(&document, dialect).unwrap();
        lint_descriptor(&descriptor)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_clean_descriptor_has_no_warnings() {
        let warnings = lint(
            json!({
                "name": "tool",
                "command-line": "tool [A]",
                "schema-version": "0.5",
                "inputs": [{
                    "id": "a",
                    "name": "A",
                    "type": "Number",
                    "value-key": "[A]",
                    "minimum": 0,
                    "maximum": 10,
                    "value-choices": [1, 2],
                    "default-value": 2,
                }],
            }),
            Dialect::Boutiques05,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_legacy_relations() {
        let warnings = lint(
            json!({
                "name": "tool",
                "command-line": "tool [A] [B]",
                "schema-version": "0.5",
                "inputs": [
                    {
                        "id": "a",
                        "name": "A",
                        "type": "Number",
                        "value-key": "[A]",
                        "minimum": 5,
                        "maximum": 1,
                        "requires-inputs": ["g", "ghost"],
                    },
                    {
                        "id": "b",
                        "name": "B",
                        "type": "String",
                        "value-key": "[B]",
                        "list": true,
                        "min-list-entries": 3,
                        "max-list-entries": 2,
                        "value-choices": ["x", "y"],
                        "default-value": "z",
                    },
                ],
                "groups": [{"id": "g", "name": "G", "members": ["a", "c"]}],
                "output-files": [{
                    "id": "out",
                    "name": "Out",
                    "conditional-path-template": [
                        {"missing > 1": "big.txt"},
                        {"default": "small.txt"},
                    ],
                }],
            }),
            Dialect::Boutiques05,
        );
        assert_eq!(
            warnings,
            vec![
                "$.inputs[0].minimum: minimum 5 is greater than maximum 1",
                "$.inputs[0].requires-inputs[1]: references unknown input or group `ghost`",
                "$.inputs[1].min-list-entries: min-list-entries 3 is greater than \
                 max-list-entries 2",
                "$.inputs[1].default-value: default value z is not one of the value choices",
                "$.groups[0].members[1]: references unknown input `c`",
                "$.output-files[0].conditional-path-template[0].missing > 1: condition refers \
                 to unknown input `missing`",
            ]
        );
    }

    #[test]
    fn test_extended_lint_recurses_into_sub_commands() {
        let warnings = lint(
            json!({
                "name": "tool",
                "command-line": "tool [MODE]",
                "schema-version": "0.5+styx",
                "inputs": [{
                    "id": "mode",
                    "value-key": "[MODE]",
                    "type": [
                        {"id": "fast", "command-line": "fast"},
                        {
                            "id": "slow",
                            "command-line": "slow",
                            "inputs": [{"id": "n", "type": "Number", "value-key": "[N]"}],
                        },
                    ],
                }],
            }),
            Dialect::StyxDescriptor1,
        );
        assert_eq!(
            warnings,
            vec![
                "$.inputs[0].type[1].inputs[0].value-key: value-key `[N]` does not appear in \
                 the command line"
            ]
        );
    }
}
