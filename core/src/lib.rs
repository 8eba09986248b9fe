//! Boutiques descriptor model, validation and JSON Schema export.
//!
//! This crate defines the typed model of Boutiques tool descriptors in two
//! dialects:
//!
//! - [`Dialect::Boutiques05`] (`boutiques-0.5`): the published, lenient
//!   format. Unknown members are ignored. See [`legacy`].
//! - [`Dialect::StyxDescriptor1`] (`boutiques-styx-descriptor-1`): a strict
//!   format whose inputs may nest whole sub-commands. See [`extended`].
//!
//! Inputs, outputs and container images are unions of concrete shapes.
//! [`validate_descriptor`] resolves each union member by its discriminating
//! keys, in a fixed priority order, and reports every failure with its path
//! ([`ValidationErrors`]). [`export`] projects the same model into a JSON
//! Schema (draft 2020-12) document, and [`lint_descriptor`] reports likely
//! authoring mistakes that neither dialect rejects.
//!
//! # Example
//!
//! ```
//! use boutiques_schema_core::*;
//! use serde_json::json;
//!
//! let document = json!({
//!     "name": "bet",
//!     "command-line": "bet [INFILE] [MASK]",
//!     "schema-version": "0.5",
//!     "inputs": [
//!         {"id": "infile", "name": "Input", "type": "File", "value-key": "[INFILE]"},
//!         {
//!             "id": "mask",
//!             "name": "Mask",
//!             "type": "Flag",
//!             "command-line-flag": "-m",
//!             "value-key": "[MASK]"
//!         }
//!     ]
//! });
//!
//! let dialect = Dialect::detect(&document).unwrap();
//! let descriptor = validate_descriptor(&document, dialect).unwrap();
//! assert_eq!(descriptor.name(), "bet");
//! assert!(lint_descriptor(&descriptor).is_empty());
//!
//! let schema = export_dialect(dialect);
//! assert!(schema["$defs"]["FlagInput"].is_object());
//! ```

mod condition;
mod descriptor;
mod dialect;
mod error;
mod lint;
mod parts;
mod primitives;
mod reader;
mod schema;
mod variant;

pub mod extended;
pub mod legacy;

pub use condition::{
    CONDITION_PATTERN, CompareOp, Condition, ConditionExpression, MAX_CONDITION_NESTING, Operand,
};
pub use descriptor::{Descriptor, validate_descriptor};
pub use dialect::{
    BOUTIQUES_0_5, BOUTIQUES_STYX_DESCRIPTOR_1, Dialect, ExtraFields, UnknownDialect,
};
pub use error::{
    DescriptorError, FieldPath, PathSegment, ValidationError, ValidationErrorKind,
    ValidationErrors,
};
pub use lint::{LintWarning, lint_descriptor};
pub use parts::{
    CommandLineFlag, ContainerOptions, FlagValue, ListSpec, StringValue, SuggestedResources,
};
pub use primitives::{
    ContainerRuntime, DockerType, ExtendedSchemaVersion, FileType, FlagType, FloatMarker,
    HttpUrl, ID_PATTERN, IdString, IntegerMarker, LegacySchemaVersion, ListMarker,
    NonEmptyString, NumberType, RootfsType, StringType, VALUE_KEY_PATTERN, ValueKeyString,
};
pub use schema::{JSON_SCHEMA_DRAFT, export, export_dialect};
pub use variant::{Cardinality, InputShape, Matcher, Prefix, ValueKind};
