//! Error types for schema export.
//!
//! One error type covers every failure of a batch run: I/O, serialization of
//! schemas and manifests, configuration parsing and unknown dialect names.

use boutiques_schema_core::UnknownDialect;
use thiserror::Error;

/// Errors that can occur while exporting schemas.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A configured dialect name is not supported.
    #[error(transparent)]
    UnknownDialect(#[from] UnknownDialect),

    /// The configuration is well-formed YAML but not usable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;
