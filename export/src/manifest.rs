//! Manifest of one batch export.
//!
//! The manifest lists every schema file written by
//! [`export_all`](crate::export_all) with the dialect it describes and the
//! SHA-256 checksum of its bytes, so published schemas can be checked for
//! accidental edits or corruption with [`ExportManifest::verify`].
//!
//! # Examples
//!
//! ```no_run
//! use boutiques_schema_export::ExportManifest;
//!
//! let manifest = ExportManifest::load("public/manifest.json").unwrap();
//! for mismatch in manifest.verify("public").unwrap() {
//!     eprintln!("{mismatch}");
//! }
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use boutiques_schema_core::JSON_SCHEMA_DRAFT;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One exported schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Dialect name, e.g. `boutiques-0.5`.
    pub dialect: String,
    /// `schema-version` literal of documents in this dialect.
    pub schema_version: String,
    /// File name relative to the output directory.
    pub file: String,
    /// SHA-256 hex digest of the file.
    pub sha256: String,
}

/// Top-level export manifest.
///
/// Persisted as pretty-printed JSON next to the schema files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Version of the package that produced the schemas.
    pub package_version: String,
    /// JSON Schema dialect of the exported documents.
    pub json_schema: String,
    /// RFC 3339 timestamp of the export.
    pub generated_at: String,
    /// Exported files, in dialect order.
    pub entries: Vec<ManifestEntry>,
}

/// A manifest entry whose file no longer matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub file: String,
    pub expected: String,
    /// `None` when the file is missing.
    pub actual: Option<String>,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: checksum {actual} does not match {}",
                self.file, self.expected
            ),
            None => write!(f, "{}: file is missing", self.file),
        }
    }
}

impl ExportManifest {
    /// Creates a manifest stamped with the current time.
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self {
            package_version: env!("CARGO_PKG_VERSION").to_string(),
            json_schema: JSON_SCHEMA_DRAFT.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) if the file cannot
    /// be read, or [`JsonError`](crate::ExportError::JsonError) if the
    /// content is not valid manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) if the file cannot
    /// be written, or [`JsonError`](crate::ExportError::JsonError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Computes the SHA-256 hex digest of a file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) if the file cannot
    /// be read.
    pub fn calculate_checksum(path: impl AsRef<Path>) -> Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(checksum(&bytes))
    }

    /// Looks up the entry of `dialect`.
    pub fn get(&self, dialect: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.dialect == dialect)
    }

    /// Recomputes the checksum of every entry under `dir`.
    ///
    /// Returns the entries that are missing or changed; an empty list means
    /// the directory matches the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) for read failures
    /// other than a missing file.
    pub fn verify(&self, dir: impl AsRef<Path>) -> Result<Vec<ChecksumMismatch>> {
        let dir = dir.as_ref();
        let mut mismatches = Vec::new();
        for entry in &self.entries {
            let actual = match std::fs::read(dir.join(&entry.file)) {
                Ok(bytes) => Some(checksum(&bytes)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => return Err(err.into()),
            };
            if actual.as_deref() != Some(entry.sha256.as_str()) {
                mismatches.push(ChecksumMismatch {
                    file: entry.file.clone(),
                    expected: entry.sha256.clone(),
                    actual,
                });
            }
        }
        Ok(mismatches)
    }
}

/// SHA-256 hex digest of `bytes`.
pub(crate) fn checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
