//! Container images of the legacy dialect.

use serde::Serialize;

use crate::parts::ContainerOptions;
use crate::primitives::{ContainerRuntime, HttpUrl, NonEmptyString, RootfsType};
use crate::reader::{FieldGroup, Fields};
use crate::schema::ObjectSchema;
use crate::variant::{Matcher, variant_family};

/// Image pulled by a container runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockerContainerImage {
    #[serde(rename = "type")]
    pub runtime: ContainerRuntime,
    pub image: NonEmptyString,
    #[serde(flatten)]
    pub options: ContainerOptions,
}

impl FieldGroup for DockerContainerImage {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let runtime = fields.required("type");
        let image = fields.required("image");
        let options = ContainerOptions::read(fields);
        Some(Self {
            runtime: runtime?,
            image: image?,
            options: options?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<ContainerRuntime>("type", "");
        schema.required::<NonEmptyString>(
            "image",
            "Name of an image where the tool is installed and configured. Example: bids/mriqc.",
        );
        ContainerOptions::describe(schema);
    }
}

/// Root file system archive fetched over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootfsContainerImage {
    #[serde(rename = "type")]
    pub kind: RootfsType,
    pub url: HttpUrl,
    #[serde(flatten)]
    pub options: ContainerOptions,
}

impl FieldGroup for RootfsContainerImage {
    fn read(fields: &mut Fields<'_, '_>) -> Option<Self> {
        let kind = fields.required("type");
        let url = fields.required("url");
        let options = ContainerOptions::read(fields);
        Some(Self {
            kind: kind?,
            url: url?,
            options: options?,
        })
    }

    fn describe(schema: &mut ObjectSchema<'_>) {
        schema.required::<RootfsType>("type", "");
        schema.required::<HttpUrl>("url", "URL where the image is available.");
        ContainerOptions::describe(schema);
    }
}

variant_family! {
    /// A legacy container image, selected by its `type` tag.
    pub enum LegacyContainerImage ("container image") in LEGACY_CONTAINERS {
        Docker(DockerContainerImage)
            if Matcher::Tag { key: "type", values: &["docker", "singularity"] }
            => "Image-based container configuration.",
        Rootfs(RootfsContainerImage)
            if Matcher::Tag { key: "type", values: &["rootfs"] }
            => "Root file system container configuration.",
    }
}

impl LegacyContainerImage {
    pub fn options(&self) -> &ContainerOptions {
        match self {
            Self::Docker(image) => &image.options,
            Self::Rootfs(image) => &image.options,
        }
    }
}
