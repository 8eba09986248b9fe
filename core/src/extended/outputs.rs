//! Output files and captured streams of the extended dialect.

use serde::Serialize;

use crate::parts::{ID_DOC, PATH_TEMPLATE_DOC, STRIPPED_EXTENSIONS_DOC};
use crate::primitives::{IdString, NonEmptyString};
use crate::reader::{FieldGroup, Fields};
use crate::schema::{ObjectSchema, named_definition};

/// A file the command writes, located by a path template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtendedOutput {
    pub id: IdString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<NonEmptyString>,
    pub path_template: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_template_stripped_extensions: Option<Vec<NonEmptyString>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_template_fallback: Option<NonEmptyString>,
}

impl FieldGroup for ExtendedOutput {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.optional("name");
        let description = fields.optional("description");
        let path_template = fields.required("path-template");
        let path_template_stripped_extensions =
            fields.optional("path-template-stripped-extensions");
        let path_template_fallback = fields.optional("path-template-fallback");
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
            path_template: path_template?,
            path_template_stripped_extensions: path_template_stripped_extensions?,
            path_template_fallback: path_template_fallback?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.optional::<NonEmptyString>("name", "A human-readable output name.");
        schema.optional::<NonEmptyString>("description", "Description of the output.");
        schema.required::<NonEmptyString>("path-template", PATH_TEMPLATE_DOC);
        schema.optional::<Vec<NonEmptyString>>(
            "path-template-stripped-extensions",
            STRIPPED_EXTENSIONS_DOC,
        );
        schema.optional::<NonEmptyString>(
            "path-template-fallback",
            "Path template used when a value key of the path template refers to an input \
             that was not given.",
        );
    }
}

named_definition!(ExtendedOutput as "Output", "Output file of a command.");

/// Standard output or standard error captured as a named output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamOutput {
    pub id: IdString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<NonEmptyString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldGroup for StreamOutput {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let id = fields.required("id");
        let name = fields.optional("name");
        let description = fields.optional("description");
        Some(Self {
            id: id?,
            name: name?,
            description: description?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<IdString>("id", ID_DOC);
        schema.optional::<NonEmptyString>("name", "A human-readable output name.");
        schema.optional::<String>("description", "Description of the output.");
    }
}

named_definition!(StreamOutput, "Captured output stream of the tool.");
