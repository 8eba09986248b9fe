//! Rendering and writing schema files.

use std::path::Path;

use boutiques_schema_core::{Dialect, export_dialect};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::Result;
use crate::manifest::{ExportManifest, MANIFEST_FILE, ManifestEntry, checksum};

/// File name of the schema of `dialect`.
pub fn schema_file_name(dialect: Dialect) -> String {
    format!("{}.json", dialect.name())
}

/// Renders the schema of `dialect` as JSON text ending in a newline.
///
/// `indent` is the number of spaces per level; `0` renders compact JSON.
///
/// # Examples
///
/// ```
/// use boutiques_schema_core::Dialect;
/// use boutiques_schema_export::render_schema;
///
/// let bytes = render_schema(Dialect::Boutiques05, 0).unwrap();
/// assert!(bytes.starts_with(b"{\"$schema\""));
/// assert_eq!(bytes.last(), Some(&b'\n'));
/// ```
pub fn render_schema(dialect: Dialect, indent: usize) -> Result<Vec<u8>> {
    let schema = export_dialect(dialect);
    let mut bytes = if indent == 0 {
        serde_json::to_vec(&schema)?
    } else {
        let spaces = vec![b' '; indent];
        let mut bytes = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(&spaces));
        schema.serialize(&mut serializer)?;
        bytes
    };
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes the schema of `dialect` to `path` and returns its checksum.
///
/// # Errors
///
/// Returns [`IoError`](crate::ExportError::IoError) if the file cannot be
/// written.
pub fn write_schema(dialect: Dialect, path: impl AsRef<Path>, indent: usize) -> Result<String> {
    let path = path.as_ref();
    let bytes = render_schema(dialect, indent)?;
    std::fs::write(path, &bytes)?;
    debug!(dialect = %dialect, path = %path.display(), bytes = bytes.len(), "wrote schema");
    Ok(checksum(&bytes))
}

/// Exports every selected dialect into `config.output_dir`.
///
/// Schemas are rendered in parallel; the returned manifest lists them in
/// dialect order. When `config.write_manifest` is set the manifest is also
/// saved as `manifest.json` in the output directory.
///
/// # Errors
///
/// Fails on an invalid configuration, an unknown dialect name, or the
/// first file that cannot be written.
pub fn export_all(config: &ExportConfig) -> Result<ExportManifest> {
    config.check()?;
    let dialects = config.selected_dialects()?;
    std::fs::create_dir_all(&config.output_dir)?;

    let entries = dialects
        .par_iter()
        .map(|&dialect| {
            let file = schema_file_name(dialect);
            let sha256 = write_schema(dialect, config.output_dir.join(&file), config.indent)?;
            info!(dialect = %dialect, file = %file, "exported schema");
            Ok(ManifestEntry {
                dialect: dialect.name().to_string(),
                schema_version: dialect.schema_version().to_string(),
                file,
                sha256,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let manifest = ExportManifest::new(entries);
    if config.write_manifest {
        manifest.save(config.output_dir.join(MANIFEST_FILE))?;
        info!(entries = manifest.entries.len(), "wrote manifest");
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_respects_indent() {
        let compact = render_schema(Dialect::StyxDescriptor1, 0).unwrap();
        assert!(!compact[..compact.len() - 1].contains(&b'\n'));

        let four = String::from_utf8(render_schema(Dialect::StyxDescriptor1, 4).unwrap()).unwrap();
        assert!(four.starts_with("{\n    \"$schema\""));

        let parsed: serde_json::Value = serde_json::from_slice(&compact).unwrap();
        assert_eq!(parsed, export_dialect(Dialect::StyxDescriptor1));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(schema_file_name(Dialect::Boutiques05), "boutiques-0.5.json");
        assert_eq!(
            schema_file_name(Dialect::StyxDescriptor1),
            "boutiques-styx-descriptor-1.json"
        );
    }

    #[test]
    fn test_write_schema_returns_file_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        let sha256 = write_schema(Dialect::Boutiques05, &path, 2).unwrap();
        assert_eq!(ExportManifest::calculate_checksum(&path).unwrap(), sha256);
    }
}
