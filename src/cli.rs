//! Command-line interface for apimap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, ScanConfig};
use crate::report;
use crate::scan::Scanner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Starter configuration written by `apimap init`.
const CONFIG_TEMPLATE: &str = r#"# apimap scan configuration
version: "1"

# Glob patterns excluded from the walk ("**" matches recursively).
excluded_paths: []
#  - "**/generated/**"

# Follow symlinks while walking (default: true).
# follow_links: true

# Descend into hidden directories (default: false).
# include_hidden: false
"#;

/// Polyglot API surface scanner.
///
/// Apimap walks a source tree, extracts the HTTP endpoints each codebase
/// exposes (produced APIs) and the external HTTP calls it makes (consumed
/// APIs), resolves symbolic path constants and environment placeholders,
/// and emits a single structured summary document.
#[derive(Parser)]
#[command(name = "apimap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a source tree and emit the API summary
    Scan(ScanArgs),
    /// Create a starter configuration file
    Init(InitArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Root directory to scan
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: yaml, json, or pretty
    #[arg(short, long, default_value = "yaml")]
    pub format: String,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional exclusion globs (repeatable)
    #[arg(short = 'e', long = "exclude")]
    pub exclude: Vec<String>,

    /// Extract files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Show per-file failure reasons in pretty output
    #[arg(long)]
    pub show_failures: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "apimap.yaml")]
    pub output: PathBuf,
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    crate::init();

    if args.format != "yaml" && args.format != "json" && args.format != "pretty" {
        eprintln!(
            "Error: invalid format {:?}, must be 'yaml', 'json', or 'pretty'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Explicit config must parse; a discovered one is best-effort optional.
    let mut config = match &args.config {
        Some(path) => match ScanConfig::parse_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config {}: {}", path.display(), e);
                return Ok(EXIT_ERROR);
            }
        },
        None => match ScanConfig::discover() {
            Some(path) => match ScanConfig::parse_file(&path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Warning: ignoring {}: {}", path.display(), e);
                    ScanConfig::default()
                }
            },
            None => ScanConfig::default(),
        },
    };
    config.excluded_paths.extend(args.exclude.iter().cloned());

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    let output = match Scanner::new(&args.path)
        .with_config(config)
        .parallel(args.parallel)
        .scan()
    {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => emit(&output.report.to_json()?, args.output.as_deref())?,
        "pretty" => report::write_pretty(&path_str, &output, args.show_failures),
        _ => emit(&output.report.to_yaml()?, args.output.as_deref())?,
    }

    Ok(EXIT_SUCCESS)
}

/// Print a serialized report or write it to a file.
fn emit(serialized: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, serialized)?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", serialized),
    }
    Ok(())
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize the walk", args.output.display());
    println!("  2. Run: apimap scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_as_config() {
        let config: ScanConfig = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(config.excluded_paths.is_empty());
        config::validate(&config).unwrap();
    }

    #[test]
    fn test_run_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("apimap.yaml");
        std::fs::write(&out, "version: \"1\"\n").unwrap();

        let code = run_init(&InitArgs { output: out }).unwrap();
        assert_eq!(code, EXIT_ERROR);
    }

    #[test]
    fn test_run_scan_rejects_bad_format() {
        let args = ScanArgs {
            path: PathBuf::from("."),
            config: None,
            format: "toml".to_string(),
            output: None,
            exclude: vec![],
            parallel: false,
            show_failures: false,
        };
        assert_eq!(run_scan(&args).unwrap(), EXIT_ERROR);
    }
}
