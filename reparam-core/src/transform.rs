//! Transform orchestration - ties together parsing, discovery, desugaring and the merge pass
//!
//! Global invariants enforced:
//! - One identifier set per run, shared by every file in traversal order
//! - A file is transformed completely or not at all

use crate::destructure::PatternUnwrapper;
use crate::diagnostics::{Diagnostics, Warning};
use crate::discover;
use crate::idents::IdentifierSet;
use crate::params::{ParamPass, PassOptions};
use crate::parser;
use crate::patch::{apply_edits, ChangeSet, Edit};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use swc_common::{sync::Lrc, SourceMap};

/// Result of transforming one file
#[derive(Debug, Clone, Serialize)]
pub struct FileTransform {
    pub file: String,
    #[serde(skip)]
    pub output: String,
    /// Edits against the original text, in emission order
    pub edits: Vec<Edit>,
    pub warnings: Vec<Warning>,
    pub functions_rewritten: usize,
}

impl FileTransform {
    pub fn changed(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// State that lives for one invocation and spans every file it touches
pub struct TransformRun {
    source_map: Lrc<SourceMap>,
    identifiers: IdentifierSet,
    options: PassOptions,
    next_file_index: usize,
}

impl TransformRun {
    pub fn new(options: PassOptions) -> Self {
        TransformRun {
            source_map: Default::default(),
            identifiers: IdentifierSet::new(),
            options,
            next_file_index: 0,
        }
    }

    pub fn options(&self) -> &PassOptions {
        &self.options
    }

    /// Transform a file on disk
    pub fn transform_file(&mut self, path: &Path) -> Result<FileTransform> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        self.transform_source(&src, &path.to_string_lossy())
    }

    /// Transform in-memory source; `filename` selects the syntax
    pub fn transform_source(&mut self, src: &str, filename: &str) -> Result<FileTransform> {
        let file_index = self.next_file_index;
        self.next_file_index += 1;

        let parsed = parser::parse_source(src, &self.source_map, filename)?;
        let mut diagnostics = Diagnostics::new();
        let mut discovery = discover::discover_functions(
            &parsed.module,
            file_index,
            parsed.base(),
            &self.source_map,
            &mut self.identifiers,
            &mut diagnostics,
        );

        let mut unwrapper = PatternUnwrapper::new(src, self.options.temp_prefix.clone());
        let mut changes = ChangeSet::new();
        let mut functions_rewritten = 0;
        {
            let mut pass = ParamPass::new(
                src,
                &mut discovery.scopes,
                &mut self.identifiers,
                &mut diagnostics,
                &mut unwrapper,
                &self.options,
            );
            for function in &discovery.functions {
                let outcome = pass.run(function, &mut changes).with_context(|| {
                    format!(
                        "failed to rewrite parameters of '{}' at {}:{}",
                        function.display_name(),
                        filename,
                        function.line
                    )
                })?;
                if !outcome.is_unchanged() {
                    functions_rewritten += 1;
                }
            }
        }

        let edits = changes.into_vec();
        let output = apply_edits(src, &edits)
            .with_context(|| format!("failed to apply edits to {}", filename))?;

        tracing::debug!(
            file = filename,
            functions = discovery.functions.len(),
            rewritten = functions_rewritten,
            edits = edits.len(),
            "transformed file"
        );

        let mut warnings = diagnostics.into_warnings();
        warnings.sort_by_key(|warning| warning.line);

        Ok(FileTransform {
            file: filename.to_string(),
            output,
            edits,
            warnings,
            functions_rewritten,
        })
    }
}

/// Transform a single in-memory file with a fresh run
pub fn transform_source(src: &str, filename: &str, options: &PassOptions) -> Result<FileTransform> {
    TransformRun::new(options.clone()).transform_source(src, filename)
}
