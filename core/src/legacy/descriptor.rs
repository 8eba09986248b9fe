//! The legacy descriptor aggregate and its supplementary sub-models.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::containers::LegacyContainerImage;
use super::inputs::LegacyInput;
use super::outputs::LegacyOutput;
use crate::parts::{COMMAND_LINE_DOC, ID_DOC, IdScope, NAME_DOC, SuggestedResources};
use crate::primitives::{HttpUrl, IdString, LegacySchemaVersion, NonEmptyString};
use crate::reader::{FieldGroup, Fields};
use crate::schema::{ObjectSchema, named_definition};

/// A named set of inputs with joint activation rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Group {
    pub id: IdString,
    pub name: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<IdString>,
    pub mutually_exclusive: bool,
    pub one_is_required: bool,
    pub all_or_none: bool,
}

impl FieldGroup for Group {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.required("name");
        let description = fields.optional("description");
        let members = fields.required("members");
        let mutually_exclusive = fields.defaulted("mutually-exclusive", false);
        let one_is_required = fields.defaulted("one-is-required", false);
        let all_or_none = fields.defaulted("all-or-none", false);
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            members: members?,
            mutually_exclusive: mutually_exclusive?,
            one_is_required: one_is_required?,
            all_or_none: all_or_none?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.required::<NonEmptyString>("name", NAME_DOC);
        schema.optional::<String>("description", "Description of the input group.");
        schema.required::<Vec<IdString>>("members", "IDs of the inputs belonging to this group.");
        schema.defaulted::<bool>(
            "mutually-exclusive",
            json!(false),
            "True if only one input in the group may be active at runtime.",
        );
        schema.defaulted::<bool>(
            "one-is-required",
            json!(false),
            "True if at least one of the inputs in the group must be active at runtime.",
        );
        schema.defaulted::<bool>(
            "all-or-none",
            json!(false),
            "True if members of the group need to be toggled together.",
        );
    }
}

named_definition!(Group, "Group of inputs.");

/// Environment variable set before the tool runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentVariable {
    pub name: NonEmptyString,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldGroup for EnvironmentVariable {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let name = fields.required("name");
        let value = fields.required("value");
        let description = fields.optional("description");
        Some(Self {
            name: name?,
            value: value?,
            description: description?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("name", "The environment variable name (identifier).");
        schema.required::<String>("value", "The environment variable value.");
        schema.optional::<String>("description", "Description of the environment variable.");
    }
}

named_definition!(EnvironmentVariable, "Environment variable of the tool.");

/// Meaning of one tool exit code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorCode {
    pub code: i64,
    pub description: NonEmptyString,
}

impl FieldGroup for ErrorCode {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let code = fields.required("code");
        let description = fields.required("description");
        Some(Self {
            code: code?,
            description: description?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<i64>("code", "Value of the exit code.");
        schema.required::<NonEmptyString>("description", "Description of the error code.");
    }
}

named_definition!(ErrorCode, "Exit code returned by the tool and its meaning.");

/// Expected checksum of one produced output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputAssertion {
    pub id: IdString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_reference: Option<String>,
}

impl FieldGroup for OutputAssertion {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let md5_reference = fields.optional("md5-reference");
        Some(Self {
            id: id?,
            md5_reference: md5_reference?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", "Id referring to an output-file.");
        schema.optional::<String>("md5-reference", "MD5 checksum string to match against.");
    }
}

named_definition!(OutputAssertion, "Assertion on one output file of a test.");

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestAssertions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_files: Option<Vec<OutputAssertion>>,
}

impl FieldGroup for TestAssertions {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let exit_code = fields.optional("exit-code");
        let output_files = fields.optional("output-files");
        Some(Self {
            exit_code: exit_code?,
            output_files: output_files?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.optional::<i64>("exit-code", "Expected code returned by the program.");
        schema.optional::<Vec<OutputAssertion>>("output-files", "");
    }
}

named_definition!(TestAssertions, "Expected results of a test invocation.");

/// A sample invocation and what it must produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub name: NonEmptyString,
    pub invocation: Map<String, Value>,
    pub assertions: TestAssertions,
}

impl FieldGroup for TestCase {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let name = fields.required("name");
        let invocation = fields.required("invocation");
        let assertions = fields.required("assertions");
        Some(Self {
            name: name?,
            invocation: invocation?,
            assertions: assertions?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("name", "Name of the test-case");
        schema.required::<Map<String, Value>>("invocation", "Invocation of the test-case.");
        schema.required::<TestAssertions>("assertions", "");
    }
}

named_definition!(TestCase, "Test case of the tool.");

/// A complete `schema-version: "0.5"` descriptor.
///
/// Members outside the model are ignored, which keeps descriptors written
/// for newer Boutiques releases readable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyDescriptor {
    pub name: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub command_line: NonEmptyString,
    pub schema_version: LegacySchemaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_image: Option<LegacyContainerImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<LegacyInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_files: Vec<LegacyOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<HttpUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_url: Option<HttpUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_by_doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_codes: Vec<ErrorCode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_resources: Option<SuggestedResources>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub online_platform_urls: Vec<HttpUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_schema: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Map<String, Value>>,
}

impl FieldGroup for LegacyDescriptor {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let name = fields.required("name");
        let tool_version = fields.optional("tool-version");
        let description = fields.optional("description");
        let command_line = fields.required("command-line");
        let schema_version = fields.required("schema-version");
        let container_image = fields.optional("container-image");
        let inputs: Option<Vec<LegacyInput>> = fields.list("inputs");
        let output_files: Option<Vec<LegacyOutput>> = fields.list("output-files");
        let groups: Option<Vec<Group>> = fields.list("groups");
        let author = fields.optional("author");
        let url = fields.optional("url");
        let descriptor_url = fields.optional("descriptor-url");
        let doi = fields.optional("doi");
        let tool_doi = fields.optional("tool-doi");
        let deprecated_by_doi = fields.optional("deprecated-by-doi");
        let shell = fields.optional("shell");
        let environment_variables = fields.list("environment-variables");
        let error_codes = fields.list("error-codes");
        let tests = fields.list("tests");
        let tags = fields.optional("tags");
        let suggested_resources = fields.optional("suggested-resources");
        let online_platform_urls = fields.list("online-platform-urls");
        let invocation_schema = fields.optional("invocation-schema");
        let custom = fields.optional("custom");

        IdScope::default().claim_each(fields, "inputs");
        IdScope::default().claim_each(fields, "output-files");
        IdScope::default().claim_each(fields, "groups");

        Some(Self {
            name: name?,
            tool_version: tool_version?,
            description: description?,
            command_line: command_line?,
            schema_version: schema_version?,
            container_image: container_image?,
            inputs: inputs?,
            output_files: output_files?,
            groups: groups?,
            author: author?,
            url: url?,
            descriptor_url: descriptor_url?,
            doi: doi?,
            tool_doi: tool_doi?,
            deprecated_by_doi: deprecated_by_doi?,
            shell: shell?,
            environment_variables: environment_variables?,
            error_codes: error_codes?,
            tests: tests?,
            tags: tags?,
            suggested_resources: suggested_resources?,
            online_platform_urls: online_platform_urls?,
            invocation_schema: invocation_schema?,
            custom: custom?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<NonEmptyString>("name", "Tool name.");
        schema.optional::<NonEmptyString>("tool-version", "Tool version.");
        schema.optional::<String>("description", "Tool description.");
        schema.required::<NonEmptyString>("command-line", COMMAND_LINE_DOC);
        schema.required::<LegacySchemaVersion>("schema-version", "Version of the schema used.");
        schema.optional::<LegacyContainerImage>("container-image", "");
        schema.optional::<Vec<LegacyInput>>("inputs", "An array of input objects");
        schema.optional::<Vec<LegacyOutput>>("output-files", "An array of output file objects");
        schema.optional::<Vec<Group>>(
            "groups",
            "Sets of identifiers of inputs, each specifying an input group.",
        );
        schema.optional::<NonEmptyString>("author", "Tool author name(s).");
        schema.optional::<HttpUrl>("url", "Tool URL.");
        schema.optional::<HttpUrl>(
            "descriptor-url",
            "Link to the descriptor itself (e.g. the GitHub repo where it is hosted).",
        );
        schema.optional::<String>("doi", "DOI of the descriptor (not of the tool itself).");
        schema.optional::<String>("tool-doi", "DOI of the tool (not of the descriptor).");
        schema.optional::<String>(
            "deprecated-by-doi",
            "DOI of the descriptor that replaces this one.",
        );
        schema.optional::<NonEmptyString>(
            "shell",
            "Absolute path of the shell interpreter to use in the container (defaults to \
             /bin/sh).",
        );
        schema.optional::<Vec<EnvironmentVariable>>(
            "environment-variables",
            "An array of key-value pairs specifying environment variable names and their values \
             to be used in the execution environment.",
        );
        schema.optional::<Vec<ErrorCode>>(
            "error-codes",
            "An array of key-value pairs specifying exit codes and their description. Can be \
             used for tools to specify the meaning of particular exit codes. Exit code 0 is \
             assumed to indicate a successful execution.",
        );
        schema.optional::<Vec<TestCase>>("tests", "");
        schema.optional::<Map<String, Value>>(
            "tags",
            "A set of key-value pairs specifying tags describing the pipeline. The tag names \
             are open, they might be more constrained in the future.",
        );
        schema.optional::<SuggestedResources>("suggested-resources", "");
        schema.optional::<Vec<HttpUrl>>(
            "online-platform-urls",
            "Online platform URLs from which the tool can be executed.",
        );
        schema.optional::<Map<String, Value>>("invocation-schema", "");
        schema.optional::<Map<String, Value>>("custom", "");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Dialect;
    use crate::error::{FieldPath, ValidationErrorKind};
    use crate::reader::{Checker, FromJson};

    fn read(value: Value) -> Result<LegacyDescriptor, crate::ValidationErrors> {
        let mut cx = Checker::new(Dialect::Boutiques05);
        let descriptor = LegacyDescriptor::from_json(&value, &FieldPath::root(), &mut cx);
        cx.finish(descriptor)
    }

    #[test]
    fn test_minimal_descriptor() {
        let descriptor = read(json!({
            "name": "tool",
            "command-line": "tool",
            "schema-version": "0.5",
        }))
        .unwrap();
        assert!(descriptor.inputs.is_empty());
        assert!(descriptor.container_image.is_none());
    }

    #[test]
    fn test_schema_version_is_fixed() {
        let errors = read(json!({
            "name": "tool",
            "command-line": "tool",
            "schema-version": "0.5+styx",
        }))
        .unwrap_err();
        assert_eq!(errors.as_slice()[0].path.to_string(), "$.schema-version");
        assert!(matches!(
            errors.as_slice()[0].kind,
            ValidationErrorKind::UnexpectedLiteral { .. }
        ));
    }

    #[test]
    fn test_supplementary_models() {
        let descriptor = read(json!({
            "name": "tool",
            "command-line": "tool [A]",
            "schema-version": "0.5",
            "inputs": [{"id": "a", "name": "A", "type": "String", "value-key": "[A]"}],
            "groups": [{"id": "g", "name": "G", "members": ["a"], "one-is-required": true}],
            "environment-variables": [{"name": "HOME", "value": "/tmp"}],
            "error-codes": [{"code": 2, "description": "bad input"}],
            "tests": [{
                "name": "smoke",
                "invocation": {"a": "x"},
                "assertions": {"exit-code": 0, "output-files": [{"id": "out"}]},
            }],
            "tags": {"domain": ["neuroinformatics"]},
            "online-platform-urls": ["https://example.org/run"],
        }))
        .unwrap();
        assert!(descriptor.groups[0].one_is_required);
        assert_eq!(descriptor.error_codes[0].code, 2);
        assert_eq!(descriptor.tests[0].assertions.exit_code, Some(0));
        assert_eq!(descriptor.online_platform_urls.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_per_collection() {
        let errors = read(json!({
            "name": "tool",
            "command-line": "tool",
            "schema-version": "0.5",
            "inputs": [
                {"id": "a", "name": "A", "type": "String", "value-key": "[A]"},
                {"id": "a", "name": "A2", "type": "File", "value-key": "[B]"},
            ],
            "output-files": [{"id": "a", "name": "Out", "path-template": "out.txt"}],
        }))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].path.to_string(), "$.inputs[1].id");
    }
}
