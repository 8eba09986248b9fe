//! The command body shared by the descriptor root and every sub-command.

use serde::Serialize;

use super::inputs::ExtendedInput;
use super::outputs::ExtendedOutput;
use crate::parts::{COMMAND_LINE_DOC, ID_DOC, IdScope};
use crate::primitives::{IdString, NonEmptyString};
use crate::reader::{FieldGroup, Fields};
use crate::schema::{ObjectSchema, named_definition};

/// A command line template with the inputs and outputs it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandBody {
    pub command_line: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<ExtendedInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_files: Option<Vec<ExtendedOutput>>,
}

impl CommandBody {
    pub fn inputs(&self) -> &[ExtendedInput] {
        self.inputs.as_deref().unwrap_or_default()
    }

    pub fn output_files(&self) -> &[ExtendedOutput] {
        self.output_files.as_deref().unwrap_or_default()
    }

    /// Claims the input and output ids of the command `fields` reads.
    ///
    /// Returns the output scope so callers can claim further ids (stream
    /// outputs share the output namespace).
    pub(crate) fn claim_ids<'v>(fields: &mut Fields<'v, '_>) -> IdScope<'v> {
        IdScope::default().claim_each(fields, "inputs");
        let mut outputs = IdScope::default();
        outputs.claim_each(fields, "output-files");
        outputs
    }
}

impl FieldGroup for CommandBody {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let command_line = fields.required("command-line");
        let inputs = fields.optional("inputs");
        let output_files = fields.optional("output-files");
        Some(Self {
            command_line: command_line?,
            inputs: inputs?,
            output_files: output_files?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("command-line", COMMAND_LINE_DOC);
        schema.optional::<Vec<ExtendedInput>>("inputs", "An array of input objects");
        schema.optional::<Vec<ExtendedOutput>>("output-files", "An array of output file objects");
    }
}

/// A nested command selected through an input's `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCommand {
    pub id: IdString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub body: CommandBody,
}

impl FieldGroup for SubCommand {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.optional("name");
        let description = fields.optional("description");
        let body = CommandBody::read(fields);
        CommandBody::claim_ids(fields);
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            body: body?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.optional::<NonEmptyString>("name", "A human-readable sub-command name.");
        schema.optional::<String>("description", "Description of the sub-command.");
        CommandBody::describe(schema);
    }
}

named_definition!(SubCommand, "Nested command with its own inputs and outputs.");

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::Dialect;
    use crate::error::{FieldPath, ValidationErrorKind};
    use crate::reader::{Checker, FromJson};

    fn read(value: Value) -> Result<SubCommand, crate::ValidationErrors> {
        let mut cx = Checker::new(Dialect::StyxDescriptor1);
        let command = SubCommand::from_json(&value, &FieldPath::root(), &mut cx);
        cx.finish(command)
    }

    #[test]
    fn test_nested_error_paths() {
        let errors = read(json!({
            "id": "outer",
            "command-line": "outer [INNER]",
            "inputs": [{
                "id": "inner",
                "value-key": "[INNER]",
                "type": {
                    "id": "leaf",
                    "command-line": "leaf [X]",
                    "inputs": [{"id": "bad-id", "type": "String", "value-key": "[X]"}],
                },
            }],
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.as_slice()[0].path.to_string(),
            "$.inputs[0].type.inputs[0].id"
        );
    }

    #[test]
    fn test_ids_are_scoped_per_command() {
        // The same id in a parent and a child scope is fine.
        let command = read(json!({
            "id": "a",
            "command-line": "a [A]",
            "inputs": [{
                "id": "a",
                "value-key": "[A]",
                "type": {
                    "id": "b",
                    "command-line": "b [A]",
                    "inputs": [{"id": "a", "type": "File", "value-key": "[A]"}],
                },
            }],
        }))
        .unwrap();
        assert_eq!(command.body.inputs().len(), 1);

        let errors = read(json!({
            "id": "a",
            "command-line": "a",
            "output-files": [
                {"id": "o", "path-template": "x"},
                {"id": "o", "path-template": "y"},
            ],
        }))
        .unwrap_err();
        assert_eq!(errors.as_slice()[0].path.to_string(), "$.output-files[1].id");
        assert_eq!(
            errors.as_slice()[0].kind,
            ValidationErrorKind::DuplicateId("o".into())
        );
    }

    #[test]
    fn test_invalid_sibling_does_not_hide_duplicates() {
        let errors = read(json!({
            "id": "a",
            "command-line": "a [X]",
            "inputs": [
                {"id": "x", "type": "File", "value-key": "[X]"},
                {"id": "x", "type": "Directory", "value-key": "[X]"},
            ],
        }))
        .unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["$.inputs[1]", "$.inputs[1].id"]);
        assert_eq!(
            errors.as_slice()[1].kind,
            ValidationErrorKind::DuplicateId("x".into())
        );
    }
}
