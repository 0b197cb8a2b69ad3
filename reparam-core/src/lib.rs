//! reparam core library - parameter desugaring of JavaScript and TypeScript for ES5 targets

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Edits address the original text and are applied by one merge pass
// - No global mutable state; run-scoped state is passed explicitly
// - No randomness, clocks, threads, or async
// - Deterministic traversal order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod ast;
pub mod config;
pub mod destructure;
pub mod diagnostics;
pub mod discover;
pub mod error;
pub mod idents;
pub mod params;
pub mod parser;
pub mod patch;
pub mod report;
pub mod scope;
pub mod span;
pub mod transform;

pub use config::ResolvedConfig;
pub use report::{render_json, render_text};
pub use transform::{transform_source, FileTransform, TransformRun};

use anyhow::{Context, Result};
use diagnostics::Warning;
use std::path::{Path, PathBuf};

/// A file that could not be transformed; nothing is written for it
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub file: PathBuf,
    pub message: String,
    pub warnings: Vec<Warning>,
}

/// Outcome of transforming a file or directory tree
#[derive(Debug, Default)]
pub struct RunReport {
    /// Successfully transformed files, in traversal order
    pub transformed: Vec<(PathBuf, FileTransform)>,
    pub failed: Vec<FileFailure>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn transforms(&self) -> Vec<FileTransform> {
        self.transformed.iter().map(|(_, t)| t.clone()).collect()
    }
}

/// Transform every supported file under `path`
///
/// A failing file is recorded in the report and the run continues.
pub fn transform_path(path: &Path, config: &ResolvedConfig) -> Result<RunReport> {
    let mut run = TransformRun::new(config.options.clone());
    let mut report = RunReport::default();

    let source_files = collect_source_files(path)?;

    for file_path in source_files {
        let relative = if path.is_dir() {
            file_path.strip_prefix(path).unwrap_or(&file_path)
        } else {
            file_path.as_path()
        };
        if !config.should_include(relative) {
            tracing::debug!(file = %file_path.display(), "excluded by configuration");
            continue;
        }

        match run.transform_file(&file_path) {
            Ok(transform) if config.warnings_as_errors && !transform.warnings.is_empty() => {
                report.failed.push(FileFailure {
                    message: format!(
                        "{} warning(s) treated as errors",
                        transform.warnings.len()
                    ),
                    file: file_path,
                    warnings: transform.warnings,
                });
            }
            Ok(transform) => report.transformed.push((file_path, transform)),
            Err(e) => {
                tracing::warn!(file = %file_path.display(), "skipping file: {:#}", e);
                report.failed.push(FileFailure {
                    file: file_path,
                    message: format!("{:#}", e),
                    warnings: Vec::new(),
                });
            }
        }
    }

    tracing::info!(
        transformed = report.transformed.len(),
        failed = report.failed.len(),
        "run complete"
    );

    Ok(report)
}

/// Collect all supported source files from a path (file or directory)
///
/// Directories are walked recursively in sorted order; hidden and build
/// directories and symlinks are skipped.
pub fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
            if parser::is_supported_file(filename) {
                files.push(path.to_path_buf());
            }
        }
    } else if path.is_dir() {
        collect_source_files_recursive(path, &mut files)?;
    } else {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "node_modules"
        || name == "dist"
        || name == "build"
        || name == "out"
        || name == "coverage"
}

/// Process one directory entry, pushing source files or recursing into dirs
fn process_dir_entry(path: PathBuf, metadata: std::fs::Metadata, files: &mut Vec<PathBuf>) -> Result<()> {
    if metadata.is_symlink() {
        return Ok(());
    }

    let name = path.file_name().and_then(|n| n.to_str());
    if metadata.is_dir() {
        if name.is_some_and(is_skipped_dir) {
            return Ok(());
        }
        collect_source_files_recursive(&path, files)?;
    } else if metadata.is_file() && name.is_some_and(parser::is_supported_file) {
        files.push(path);
    }

    Ok(())
}

/// Recursively collect supported source files from a directory
fn collect_source_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        process_dir_entry(path, metadata, files)?;
    }

    Ok(())
}
