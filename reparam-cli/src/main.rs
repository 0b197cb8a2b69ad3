//! reparam CLI - rewrites destructured, defaulted and rest parameters for ES5 targets

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Nothing is written for a file that failed

use anyhow::Context;
use clap::{Parser, Subcommand};
use reparam_core::config;
use reparam_core::{render_json, render_text, transform_path, FileFailure, RunReport};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reparam")]
#[command(about = "Rewrite modern parameter syntax into ES5-compatible statements")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite files and emit the result
    Transform {
        /// Path to a source file or directory
        path: PathBuf,

        /// Write results under this directory, mirroring relative paths
        #[arg(long, conflicts_with = "in_place")]
        out_dir: Option<PathBuf>,

        /// Overwrite the input files
        #[arg(long)]
        in_place: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the edits that would be applied
    Edits {
        /// Path to a source file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let report = match cli.command {
        Commands::Transform {
            path,
            out_dir,
            in_place,
            config,
        } => {
            let path = normalize(path)?;
            let report = run(&path, config.as_deref())?;
            print_warnings(&report);
            emit(&path, &report, out_dir.as_deref(), in_place)?;
            report
        }
        Commands::Edits {
            path,
            format,
            config,
        } => {
            let path = normalize(path)?;
            let report = run(&path, config.as_deref())?;
            let transforms = report.transforms();
            match format {
                OutputFormat::Text => print!("{}", render_text(&transforms)),
                OutputFormat::Json => println!("{}", render_json(&transforms)),
            }
            report
        }
    };

    print_failures(&report.failed);
    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// Log to stderr; `-v` raises the default level and RUST_LOG wins when set
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::builder().parse_lossy(level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Normalize path to absolute and check it exists
fn normalize(path: PathBuf) -> anyhow::Result<PathBuf> {
    let normalized = if path.is_relative() {
        std::env::current_dir()?.join(&path)
    } else {
        path
    };
    if !normalized.exists() {
        anyhow::bail!("Path does not exist: {}", normalized.display());
    }
    Ok(normalized)
}

fn run(path: &Path, config_path: Option<&Path>) -> anyhow::Result<RunReport> {
    let project_root = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    let resolved = config::load_and_resolve(project_root, config_path)?;
    if let Some(ref config_path) = resolved.config_path {
        eprintln!("Using config: {}", config_path.display());
    }
    tracing::debug!(
        path = %path.display(),
        temp_prefix = %resolved.options.temp_prefix,
        "starting run"
    );
    transform_path(path, &resolved)
}

/// Write transformed text to stdout, an output directory, or back in place
fn emit(path: &Path, report: &RunReport, out_dir: Option<&Path>, in_place: bool) -> anyhow::Result<()> {
    if let Some(out_dir) = out_dir {
        for (file, transform) in &report.transformed {
            let relative = if path.is_dir() {
                file.strip_prefix(path).unwrap_or(file)
            } else {
                Path::new(file.file_name().unwrap_or(file.as_os_str()))
            };
            let target = out_dir.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(&target, &transform.output)
                .with_context(|| format!("Failed to write file: {}", target.display()))?;
        }
        return Ok(());
    }

    if in_place {
        for (file, transform) in report.transformed.iter().filter(|(_, t)| t.changed()) {
            std::fs::write(file, &transform.output)
                .with_context(|| format!("Failed to write file: {}", file.display()))?;
        }
        return Ok(());
    }

    if path.is_dir() {
        anyhow::bail!("transforming a directory requires --out-dir or --in-place");
    }
    for (_, transform) in &report.transformed {
        print!("{}", transform.output);
    }
    Ok(())
}

fn print_warnings(report: &RunReport) {
    for (file, transform) in &report.transformed {
        for warning in &transform.warnings {
            eprintln!(
                "warning: {}:{}: {}",
                file.display(),
                warning.line,
                warning.message()
            );
        }
    }
}

fn print_failures(failed: &[FileFailure]) {
    for failure in failed {
        for warning in &failure.warnings {
            eprintln!(
                "warning: {}:{}: {}",
                failure.file.display(),
                warning.line,
                warning.message()
            );
        }
        eprintln!("error: {}: {}", failure.file.display(), failure.message);
    }
    if !failed.is_empty() {
        eprintln!("Failed to transform {} file(s)", failed.len());
    }
}
