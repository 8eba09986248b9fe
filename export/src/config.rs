//! Batch export configuration.
//!
//! Defines the YAML-serializable configuration that controls which dialects
//! are exported, where the files go and how they are formatted.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! dialects:
//!   - boutiques-0.5
//!   - boutiques-styx-descriptor-1
//! output_dir: public
//! indent: 2
//! write_manifest: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use boutiques_schema_core::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Configuration format understood by this crate.
pub const CONFIG_VERSION: &str = "1.0";

/// Largest accepted pretty-printing indent.
pub const MAX_INDENT: usize = 8;

/// Top-level batch export configuration.
///
/// Every field but `version` may be omitted.
///
/// # Examples
///
/// ```
/// use boutiques_schema_export::ExportConfig;
///
/// let config: ExportConfig = serde_yaml::from_str("version: \"1.0\"").unwrap();
/// assert_eq!(config.output_dir.to_str(), Some("public"));
/// assert_eq!(config.indent, 2);
/// assert!(config.write_manifest);
/// assert_eq!(config.selected_dialects().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Dialect names to export (empty = every dialect).
    #[serde(default)]
    pub dialects: Vec<String>,
    /// Directory receiving the schema files and the manifest.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Spaces per indentation level; `0` writes compact JSON.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Whether `manifest.json` is written next to the schemas.
    #[serde(default = "default_write_manifest")]
    pub write_manifest: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_indent() -> usize {
    2
}

fn default_write_manifest() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            dialects: Vec::new(),
            output_dir: default_output_dir(),
            indent: default_indent(),
            write_manifest: default_write_manifest(),
        }
    }
}

impl ExportConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) if the file cannot
    /// be read, [`YamlError`](crate::ExportError::YamlError) if parsing
    /// fails, or [`InvalidConfig`](crate::ExportError::InvalidConfig) if the
    /// values are out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.check()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ExportError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::ExportError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks the values serde cannot.
    pub fn check(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(ExportError::InvalidConfig(format!(
                "unsupported config version {:?} (expected {CONFIG_VERSION:?})",
                self.version
            )));
        }
        if self.indent > MAX_INDENT {
            return Err(ExportError::InvalidConfig(format!(
                "indent {} is larger than {MAX_INDENT}",
                self.indent
            )));
        }
        Ok(())
    }

    /// Returns the dialects to export, in [`Dialect::ALL`] order.
    ///
    /// An empty list selects every dialect. Duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownDialect`](crate::ExportError::UnknownDialect) for the
    /// first name that is not a dialect.
    pub fn selected_dialects(&self) -> Result<Vec<Dialect>> {
        if self.dialects.is_empty() {
            return Ok(Dialect::ALL.to_vec());
        }
        let mut selected = self
            .dialects
            .iter()
            .map(|name| name.parse::<Dialect>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        selected.sort();
        selected.dedup();
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
dialects:
  - boutiques-styx-descriptor-1
  - boutiques-0.5
  - boutiques-0.5
output_dir: dist/schemas
indent: 4
write_manifest: false
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ExportConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.dialects.len(), 3);
        assert_eq!(config.output_dir, PathBuf::from("dist/schemas"));
        assert_eq!(config.indent, 4);
        assert!(!config.write_manifest);
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: ExportConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_selected_dialects_follow_dialect_order() {
        let config: ExportConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(
            config.selected_dialects().unwrap(),
            vec![Dialect::Boutiques05, Dialect::StyxDescriptor1]
        );
    }

    #[test]
    fn test_selected_dialects_rejects_unknown_names() {
        let config = ExportConfig {
            dialects: vec!["boutiques-0.5".into(), "boutiques-9".into()],
            ..ExportConfig::default()
        };
        let err = config.selected_dialects().unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnknownDialect(ref unknown) if unknown.0 == "boutiques-9"
        ));
    }

    #[test]
    fn test_check_rejects_out_of_range_values() {
        let config = ExportConfig {
            version: "2.0".into(),
            ..ExportConfig::default()
        };
        assert!(matches!(config.check(), Err(ExportError::InvalidConfig(_))));

        let config = ExportConfig {
            indent: 12,
            ..ExportConfig::default()
        };
        assert!(matches!(config.check(), Err(ExportError::InvalidConfig(_))));
        assert!(ExportConfig::default().check().is_ok());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.yml");

        let original: ExportConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = ExportConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
