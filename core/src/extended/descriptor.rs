//! The extended descriptor aggregate.

use serde::Serialize;

use super::command::CommandBody;
use super::outputs::StreamOutput;
use crate::parts::{ContainerOptions, SuggestedResources};
use crate::primitives::{DockerType, ExtendedSchemaVersion, HttpUrl, NonEmptyString};
use crate::reader::{FieldGroup, Fields};
use crate::schema::{ObjectSchema, named_definition};

/// Container image of an extended descriptor; only docker images exist here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedContainerImage {
    #[serde(rename = "type")]
    pub kind: DockerType,
    pub image: NonEmptyString,
    #[serde(flatten)]
    pub options: ContainerOptions,
}

impl FieldGroup for ExtendedContainerImage {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let image = fields.required("image");
        let options = ContainerOptions::read(fields);
        Some(Self {
            kind: kind?,
            image: image?,
            options: options?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<DockerType>("type", "");
        schema.required::<NonEmptyString>(
            "image",
            "Name of an image where the tool is installed and configured. Example: bids/mriqc.",
        );
        ContainerOptions::describe(schema);
    }
}

named_definition!(ExtendedContainerImage as "ContainerImage", "Docker container configuration.");

/// A complete `schema-version: "0.5+styx"` descriptor.
///
/// The root is itself a command: its command line, inputs and outputs use
/// the same [`CommandBody`] as every nested sub-command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedDescriptor {
    pub name: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema_version: ExtendedSchemaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<HttpUrl>,
    #[serde(flatten)]
    pub body: CommandBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_image: Option<ExtendedContainerImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_resources: Option<SuggestedResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_output: Option<StreamOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr_output: Option<StreamOutput>,
}

impl FieldGroup for ExtendedDescriptor {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let name = fields.required("name");
        let description = fields.optional("description");
        let schema_version = fields.required("schema-version");
        let author = fields.optional("author");
        let url = fields.optional("url");
        let body = CommandBody::read(fields);
        let container_image = fields.optional("container-image");
        let suggested_resources = fields.optional("suggested-resources");
        let stdout_output: Option<Option<StreamOutput>> = fields.optional("stdout-output");
        let stderr_output: Option<Option<StreamOutput>> = fields.optional("stderr-output");

        let mut outputs = CommandBody::claim_ids(fields);
        outputs.claim_one(fields, "stdout-output");
        outputs.claim_one(fields, "stderr-output");

        Some(Self {
            name: name?,
            description: description?,
            schema_version: schema_version?,
            author: author?,
            url: url?,
            body: body?,
            container_image: container_image?,
            suggested_resources: suggested_resources?,
            stdout_output: stdout_output?,
            stderr_output: stderr_output?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("name", "Tool name.");
        schema.optional::<String>("description", "Tool description.");
        schema.required::<ExtendedSchemaVersion>("schema-version", "Version of the schema used.");
        schema.optional::<NonEmptyString>("author", "Tool author name(s).");
        schema.optional::<HttpUrl>("url", "Tool URL.");
        CommandBody::describe(schema);
        schema.optional::<ExtendedContainerImage>("container-image", "");
        schema.optional::<SuggestedResources>("suggested-resources", "");
        schema.optional::<StreamOutput>(
            "stdout-output",
            "Standard output of the tool, captured as an output file.",
        );
        schema.optional::<StreamOutput>(
            "stderr-output",
            "Standard error of the tool, captured as an output file.",
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::Dialect;
    use crate::error::{FieldPath, ValidationErrorKind};
    use crate::reader::{Checker, FromJson};

    fn read(value: Value) -> Result<ExtendedDescriptor, crate::ValidationErrors> {
        let mut cx = Checker::new(Dialect::StyxDescriptor1);
        let descriptor = ExtendedDescriptor::from_json(&value, &FieldPath::root(), &mut cx);
        cx.finish(descriptor)
    }

    #[test]
    fn test_full_descriptor() {
        let descriptor = read(json!({
            "name": "bet",
            "schema-version": "0.5+styx",
            "command-line": "bet [IN] [OUT]",
            "url": "https://fsl.fmrib.ox.ac.uk",
            "container-image": {"type": "docker", "image": "brainlife/fsl:6.0.4"},
            "suggested-resources": {"cpu-cores": 2, "ram": 4},
            "inputs": [
                {"id": "in", "type": "File", "value-key": "[IN]"},
                {"id": "out", "type": "String", "value-key": "[OUT]"},
            ],
            "output-files": [{"id": "brain", "path-template": "[OUT].nii.gz"}],
            "stdout-output": {"id": "log"},
        }))
        .unwrap();
        assert_eq!(descriptor.body.inputs().len(), 2);
        assert_eq!(descriptor.container_image.unwrap().image.as_str(), "brainlife/fsl:6.0.4");
        assert_eq!(descriptor.stdout_output.unwrap().id.as_str(), "log");
    }

    #[test]
    fn test_rootfs_is_not_an_extended_container() {
        let errors = read(json!({
            "name": "tool",
            "schema-version": "0.5+styx",
            "command-line": "tool",
            "container-image": {"type": "rootfs", "url": "https://example.org/fs.tar"},
        }))
        .unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "$.container-image.type",
                "$.container-image.image",
                "$.container-image.url"
            ]
        );
    }

    #[test]
    fn test_stream_ids_share_output_namespace() {
        let errors = read(json!({
            "name": "tool",
            "schema-version": "0.5+styx",
            "command-line": "tool",
            "output-files": [{"id": "log", "path-template": "log.txt"}],
            "stdout-output": {"id": "out"},
            "stderr-output": {"id": "log"},
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].path.to_string(), "$.stderr-output.id");
        assert_eq!(
            errors.as_slice()[0].kind,
            ValidationErrorKind::DuplicateId("log".into())
        );
    }
}
