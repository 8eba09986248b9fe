use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use boutiques_schema_core::{Descriptor, Dialect, lint_descriptor, validate_descriptor};
use boutiques_schema_export::{
    ExportConfig, ExportManifest, MANIFEST_FILE, export_all, render_schema, write_schema,
};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the log filter directives.
const LOG_ENV_VAR: &str = "BOUTIQUES_SCHEMA_LOG";

/// Indentation of schemas written by `export`.
const EXPORT_INDENT: usize = 2;

#[derive(Debug, Parser)]
#[command(name = "boutiques-schema")]
#[command(about = "Boutiques descriptor JSON Schema export and validation")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print or write the JSON Schema of one dialect.
    Export(ExportArgs),
    /// Write the schema of every configured dialect plus a manifest.
    ExportAll(ExportAllArgs),
    /// Validate descriptor JSON files.
    Validate(ValidateArgs),
    /// Check exported schemas against their manifest.
    Verify(VerifyArgs),
    /// List supported dialect names.
    Dialects,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Dialect name, e.g. boutiques-0.5.
    dialect: String,
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExportAllArgs {
    /// YAML export configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory (overrides the configuration).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Spaces per indentation level (overrides the configuration).
    #[arg(long)]
    indent: Option<usize>,
    /// Do not write manifest.json.
    #[arg(long)]
    no_manifest: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Descriptor files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Dialect to validate against (detected from schema-version if omitted).
    #[arg(long)]
    dialect: Option<String>,
    /// Also report lint warnings.
    #[arg(long)]
    lint: bool,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// Directory containing manifest.json and the schema files.
    dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Export(args) => run_export(args),
        Command::ExportAll(args) => run_export_all(args),
        Command::Validate(args) => run_validate(args),
        Command::Verify(args) => run_verify(args),
        Command::Dialects => run_dialects(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_env_var(LOG_ENV_VAR)
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn parse_dialect(name: &str) -> Result<Dialect, String> {
    name.parse::<Dialect>()
        .map_err(|err| format!("{err} (supported: {})", Dialect::names().join(", ")))
}

// ---------------------------------------------------------------------------
// export command
// ---------------------------------------------------------------------------

fn run_export(args: ExportArgs) -> Result<(), String> {
    let dialect = parse_dialect(&args.dialect)?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            write_schema(dialect, &path, EXPORT_INDENT)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!("Results written to {}", path.display());
        }
        None => {
            let bytes = render_schema(dialect, EXPORT_INDENT).map_err(|err| err.to_string())?;
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(|err| format!("Failed to write to stdout: {err}"))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// export-all command
// ---------------------------------------------------------------------------

fn run_export_all(args: ExportAllArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => ExportConfig::load(path)
            .map_err(|e| format!("Failed to load export config '{}': {e}", path.display()))?,
        None => ExportConfig::default(),
    };
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if args.no_manifest {
        config.write_manifest = false;
    }
    debug!(?config, "resolved export configuration");

    let manifest = export_all(&config).map_err(|err| err.to_string())?;
    for entry in &manifest.entries {
        println!("  {} -> {}", entry.dialect, entry.file);
    }
    println!(
        "Exported {} schema(s) into '{}'.",
        manifest.entries.len(),
        config.output_dir.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let forced = args.dialect.as_deref().map(parse_dialect).transpose()?;

    let mut failed = 0usize;
    for path in &args.files {
        match validate_file(path, forced) {
            Ok(descriptor) => {
                println!("{}: ok ({})", path.display(), descriptor.dialect());
                if args.lint {
                    for warning in lint_descriptor(&descriptor) {
                        warn!(file = %path.display(), "{warning}");
                    }
                }
            }
            Err(problems) => {
                failed += 1;
                for problem in problems {
                    eprintln!("{}: {problem}", path.display());
                }
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} descriptor(s) failed validation",
            args.files.len()
        ));
    }
    println!("Validated {} descriptor(s).", args.files.len());
    Ok(())
}

/// Validates one file, returning every problem as a printable line.
fn validate_file(path: &Path, forced: Option<Dialect>) -> Result<Descriptor, Vec<String>> {
    let text = fs::read_to_string(path).map_err(|err| vec![format!("cannot read file: {err}")])?;
    let document: Value =
        serde_json::from_str(&text).map_err(|err| vec![format!("invalid JSON: {err}")])?;

    let dialect = match forced.or_else(|| Dialect::detect(&document)) {
        Some(dialect) => dialect,
        None => {
            return Err(vec![
                "cannot detect dialect from schema-version; pass --dialect".to_string(),
            ]);
        }
    };
    debug!(file = %path.display(), dialect = %dialect, "validating descriptor");

    validate_descriptor(&document, dialect)
        .map_err(|errors| errors.iter().map(|error| error.to_string()).collect())
}

// ---------------------------------------------------------------------------
// verify command
// ---------------------------------------------------------------------------

fn run_verify(args: VerifyArgs) -> Result<(), String> {
    let manifest_path = args.dir.join(MANIFEST_FILE);
    let manifest = ExportManifest::load(&manifest_path)
        .map_err(|e| format!("Failed to load manifest '{}': {e}", manifest_path.display()))?;
    let mismatches = manifest.verify(&args.dir).map_err(|err| err.to_string())?;

    if !mismatches.is_empty() {
        for mismatch in &mismatches {
            eprintln!("  {mismatch}");
        }
        return Err(format!(
            "{} of {} schema file(s) do not match the manifest",
            mismatches.len(),
            manifest.entries.len()
        ));
    }
    println!(
        "{} schema file(s) match the manifest generated at {}.",
        manifest.entries.len(),
        manifest.generated_at
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// dialects command
// ---------------------------------------------------------------------------

fn run_dialects() -> Result<(), String> {
    for dialect in Dialect::ALL {
        println!("{}\tschema-version {}", dialect.name(), dialect.schema_version());
    }
    Ok(())
}
