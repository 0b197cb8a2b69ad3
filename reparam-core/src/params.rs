//! Parameter desugaring
//!
//! Rewrites destructured, defaulted and rest parameters into `var` statements at
//! the start of the function body, reading call-time values through `arguments`
//! so omitted arguments and argument positions behave as before.
//!
//! Global invariants enforced:
//! - Edits address the original text and stay inside the function's parameter
//!   list and its body anchor
//! - All insertions of a function share one anchor and follow parameter order
//! - A parameter is replaced at most once, yielding one insertion and one removal
//! - A function contributes all of its edits or none

mod classify;
mod defaults;
mod destructured;
mod render;
mod rest;

pub use classify::{classify, ParamLayout};

use crate::ast::FunctionNode;
use crate::destructure::Unwrapper;
use crate::diagnostics::Diagnostics;
use crate::error::DesugarError;
use crate::idents::IdentifierSet;
use crate::patch::{ChangeSet, Edit, EditKind};
use crate::scope::{DeclKind, Position, ScopeId, ScopeRegistry};
use crate::span::SourceSpan;

/// Knobs for generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOptions {
    /// Prefix of generated temporaries and placeholders
    pub temp_prefix: String,
    /// Emit `tmp = null;` after declarations that introduced temporaries
    pub cleanup_temporaries: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        PassOptions {
            temp_prefix: "$D".to_string(),
            cleanup_temporaries: true,
        }
    }
}

/// What the pass did to one function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionOutcome {
    /// Indices of replaced positional parameters, in replacement order
    pub replaced: Vec<usize>,
    pub rest_replaced: bool,
    /// Leaf names registered into the hoist scope
    pub registered: Vec<String>,
    pub edit_count: usize,
}

impl FunctionOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.edit_count == 0
    }
}

/// Working state for the function being rewritten
struct Rewrite<'f> {
    function: &'f FunctionNode,
    layout: ParamLayout,
    hoist: ScopeId,
    marks: Vec<bool>,
    edits: Vec<Edit>,
    outcome: FunctionOutcome,
}

impl Rewrite<'_> {
    fn mark_replaced(&mut self, index: usize) -> Result<(), DesugarError> {
        let twice = DesugarError::ParamReplacedTwice {
            line: self.function.line,
            index,
        };
        let mark = self.marks.get_mut(index).ok_or_else(|| twice.clone())?;
        if *mark {
            return Err(twice);
        }
        *mark = true;
        self.outcome.replaced.push(index);
        Ok(())
    }

    fn insert(&mut self, text: String) {
        self.edits
            .push(Edit::insert(self.layout.anchor, text, EditKind::Prologue));
    }

    /// Delete `[start, end)`; removing the last element also takes a trailing comma
    fn remove(&mut self, start: usize, end: usize) {
        let end = match self.layout.trailing_comma {
            Some(comma) if self.layout.list_end == Some(end) => comma.end,
            _ => end,
        };
        self.edits
            .push(Edit::delete(SourceSpan::new(start, end), EditKind::Removal));
    }

    /// End of the list element before positional parameter `index`
    fn previous_end(&self, index: usize) -> Option<usize> {
        match index.checked_sub(1) {
            Some(previous) => Some(self.function.params[previous].span.end),
            None => self.function.this_param.map(|this| this.end),
        }
    }
}

/// Runs the three emitters over one function at a time
///
/// The scope registry, identifier set and warning channel outlive the pass; the
/// change set is passed per call so sibling stages can share it.
pub struct ParamPass<'a> {
    source: &'a str,
    scopes: &'a mut ScopeRegistry,
    identifiers: &'a mut IdentifierSet,
    diagnostics: &'a mut Diagnostics,
    unwrapper: &'a mut dyn Unwrapper,
    options: &'a PassOptions,
}

impl<'a> ParamPass<'a> {
    pub fn new(
        source: &'a str,
        scopes: &'a mut ScopeRegistry,
        identifiers: &'a mut IdentifierSet,
        diagnostics: &'a mut Diagnostics,
        unwrapper: &'a mut dyn Unwrapper,
        options: &'a PassOptions,
    ) -> Self {
        ParamPass {
            source,
            scopes,
            identifiers,
            diagnostics,
            unwrapper,
            options,
        }
    }

    /// Rewrite one function, appending its edits to `changes` on success
    pub fn run(
        &mut self,
        function: &FunctionNode,
        changes: &mut ChangeSet,
    ) -> Result<FunctionOutcome, DesugarError> {
        let layout = classify(function, self.source)?;
        if !function.has_modern_params() {
            return Ok(FunctionOutcome::default());
        }

        let scope = self
            .scopes
            .scope_of(function.id)
            .ok_or(DesugarError::MissingScope {
                line: function.line,
            })?;
        let hoist = self.scopes.closest_hoist_scope(scope);

        let mut rewrite = Rewrite {
            function,
            marks: vec![false; layout.param_count],
            layout,
            hoist,
            edits: Vec::new(),
            outcome: FunctionOutcome::default(),
        };

        self.destructured_params(&mut rewrite)?;
        self.defaulted_params(&mut rewrite)?;
        self.rest_param(&mut rewrite)?;

        tracing::debug!(
            function = function.display_name(),
            line = function.line,
            edits = rewrite.edits.len(),
            "rewrote parameters"
        );

        rewrite.outcome.edit_count = rewrite.edits.len();
        changes.extend(rewrite.edits);
        Ok(rewrite.outcome)
    }

    /// Declare a generated leaf in the hoist scope and the identifier set
    fn register(&mut self, rewrite: &mut Rewrite<'_>, name: &str, origin: SourceSpan, position: Position) {
        self.scopes
            .declare(rewrite.hoist, name, DeclKind::Var, origin, Some(position));
        self.identifiers.insert(name);
        rewrite.outcome.registered.push(name.to_string());
    }

    fn slice(&self, span: SourceSpan) -> Result<&'a str, DesugarError> {
        span.text(self.source).ok_or(DesugarError::InvalidRange {
            start: span.start,
            end: span.end,
        })
    }
}

#[cfg(test)]
#[path = "params/tests.rs"]
mod tests;
