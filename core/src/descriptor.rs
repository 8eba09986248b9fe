//! Validation entry points.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{DescriptorError, FieldPath, ValidationErrors};
use crate::extended::ExtendedDescriptor;
use crate::legacy::LegacyDescriptor;
use crate::reader::{Checker, FromJson};

/// A descriptor accepted by one of the dialects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Descriptor {
    Legacy(LegacyDescriptor),
    Extended(ExtendedDescriptor),
}

impl Descriptor {
    /// Parses and validates descriptor text.
    pub fn from_json_str(text: &str, dialect: Dialect) -> Result<Self, DescriptorError> {
        let document: Value = serde_json::from_str(text)?;
        Ok(validate_descriptor(&document, dialect)?)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Legacy(_) => Dialect::Boutiques05,
            Self::Extended(_) => Dialect::StyxDescriptor1,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Legacy(descriptor) => descriptor.name.as_str(),
            Self::Extended(descriptor) => descriptor.name.as_str(),
        }
    }

    /// The root command line template.
    pub fn command_line(&self) -> &str {
        match self {
            Self::Legacy(descriptor) => descriptor.command_line.as_str(),
            Self::Extended(descriptor) => descriptor.body.command_line.as_str(),
        }
    }
}

/// Validates `document` against `dialect`.
///
/// Every problem is collected before returning, so the error lists all
/// failures with their paths rather than only the first.
///
/// # Examples
///
/// ```
/// use boutiques_schema_core::{Descriptor, Dialect, validate_descriptor};
/// use serde_json::json;
///
/// let document = json!({
///     "name": "tool",
///     "command-line": "tool [A] [B]",
///     "schema-version": "0.5",
///     "inputs": [
///         {"id": "a", "name": "A", "type": "Number", "value-key": "[A]"},
///         {"id": "b", "name": "B", "type": "Number", "integer": false, "value-key": "[B]"}
///     ]
/// });
/// let validated = validate_descriptor(&document, Dialect::Boutiques05).unwrap();
/// let Descriptor::Legacy(descriptor) = validated else {
///     unreachable!()
/// };
/// assert_eq!(descriptor.inputs[0].variant_name(), "IntegerInput");
/// assert_eq!(descriptor.inputs[1].variant_name(), "FloatInput");
/// ```
pub fn validate_descriptor(
    document: &Value,
    dialect: Dialect,
) -> Result<Descriptor, ValidationErrors> {
    debug!(dialect = %dialect, "validating descriptor");
    let mut cx = Checker::new(dialect);
    let root = FieldPath::root();
    let descriptor = match dialect {
        Dialect::Boutiques05 => {
            LegacyDescriptor::from_json(document, &root, &mut cx).map(Descriptor::Legacy)
        }
        Dialect::StyxDescriptor1 => {
            ExtendedDescriptor::from_json(document, &root, &mut cx).map(Descriptor::Extended)
        }
    };
    cx.finish(descriptor)
}
