//! Descriptor dialects.
//!
//! A dialect is one named configuration of the descriptor format. The legacy
//! `boutiques-0.5` dialect is permissive (unknown members are ignored); the
//! extended `boutiques-styx-descriptor-1` dialect is strict and adds nested
//! sub-commands and captured-stream outputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Exporter name of the legacy dialect.
pub const BOUTIQUES_0_5: &str = "boutiques-0.5";

/// Exporter name of the extended dialect.
pub const BOUTIQUES_STYX_DESCRIPTOR_1: &str = "boutiques-styx-descriptor-1";

/// Selects a complete variant-family configuration.
///
/// # Examples
///
/// ```
/// use boutiques_schema_core::Dialect;
///
/// let dialect: Dialect = "boutiques-0.5".parse().unwrap();
/// assert_eq!(dialect, Dialect::Boutiques05);
/// assert_eq!(dialect.schema_version(), "0.5");
/// assert!("not-a-real-dialect".parse::<Dialect>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    /// Legacy Boutiques 0.5 descriptors.
    #[serde(rename = "boutiques-0.5")]
    Boutiques05,
    /// Strict Boutiques dialect with nested sub-commands.
    #[serde(rename = "boutiques-styx-descriptor-1")]
    StyxDescriptor1,
}

/// How members not declared by the model are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFields {
    /// Silently accepted and dropped.
    Ignore,
    /// Reported as [`UnknownField`](crate::ValidationErrorKind::UnknownField).
    Forbid,
}

impl Dialect {
    /// Every supported dialect, in export order.
    pub const ALL: [Dialect; 2] = [Dialect::Boutiques05, Dialect::StyxDescriptor1];

    /// Exporter name (also the file stem of the exported schema).
    pub fn name(self) -> &'static str {
        match self {
            Self::Boutiques05 => BOUTIQUES_0_5,
            Self::StyxDescriptor1 => BOUTIQUES_STYX_DESCRIPTOR_1,
        }
    }

    /// Literal a document of this dialect carries in `schema-version`.
    pub fn schema_version(self) -> &'static str {
        match self {
            Self::Boutiques05 => "0.5",
            Self::StyxDescriptor1 => "0.5+styx",
        }
    }

    /// Extra-member policy.
    pub fn extra_fields(self) -> ExtraFields {
        match self {
            Self::Boutiques05 => ExtraFields::Ignore,
            Self::StyxDescriptor1 => ExtraFields::Forbid,
        }
    }

    /// Picks the dialect named by a document's `schema-version` member.
    ///
    /// # Examples
    ///
    /// ```
    /// use boutiques_schema_core::Dialect;
    /// use serde_json::json;
    ///
    /// let document = json!({"schema-version": "0.5+styx"});
    /// assert_eq!(Dialect::detect(&document), Some(Dialect::StyxDescriptor1));
    /// assert_eq!(Dialect::detect(&json!({})), None);
    /// ```
    pub fn detect(document: &Value) -> Option<Self> {
        let version = document.get("schema-version")?.as_str()?;
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.schema_version() == version)
    }

    /// Names of every supported dialect.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|dialect| dialect.name()).collect()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name() == s)
            .ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

/// A dialect name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schema: {0} (expected one of: {})", Dialect::names().join(", "))]
pub struct UnknownDialect(pub String);
