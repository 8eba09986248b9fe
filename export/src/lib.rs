//! Batch export of Boutiques descriptor JSON Schemas.
//!
//! This crate writes the schema of each supported dialect to disk, driven by
//! a small YAML configuration, and records what it wrote in a checksummed
//! manifest.
//!
//! # Quick start
//!
//! ```no_run
//! use boutiques_schema_export::{ExportConfig, export_all};
//!
//! let config = ExportConfig::load("export.yml").unwrap();
//! let manifest = export_all(&config).unwrap();
//! for entry in &manifest.entries {
//!     println!("{} -> {} ({})", entry.dialect, entry.file, entry.sha256);
//! }
//! ```

mod config;
mod error;
mod manifest;
mod writer;

pub use config::{CONFIG_VERSION, ExportConfig, MAX_INDENT};
pub use error::{ExportError, Result};
pub use manifest::{ChecksumMismatch, ExportManifest, MANIFEST_FILE, ManifestEntry};
pub use writer::{export_all, render_schema, schema_file_name, write_schema};
