//! Typed failures for the desugaring pass and the merge pass
//!
//! Both enums describe upstream contract violations, not user errors in the
//! transformed program. Either one aborts the transform of the current file.

use thiserror::Error;

/// Internal-consistency failures raised while rewriting one function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesugarError {
    #[error("function at line {line} has {defaults} default values but only {params} parameters")]
    DefaultsExceedParams {
        line: u32,
        defaults: usize,
        params: usize,
    },

    #[error("nested definition reading `{temporary}` targets a pattern instead of a simple name")]
    NonSimpleDefinitionTarget { temporary: String },

    #[error("parameter {index} of function at line {line} was replaced twice")]
    ParamReplacedTwice { line: u32, index: usize },

    #[error("function at line {line} has no associated scope")]
    MissingScope { line: u32 },

    #[error("source range {start}..{end} is not valid text in the file")]
    InvalidRange { start: usize, end: usize },
}

/// Violations of the merge contract (sorted, disjoint, in-bounds edits)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("edit {start}..{end} is inverted")]
    Inverted { start: usize, end: usize },

    #[error("edit {start}..{end} exceeds source length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("edit boundary {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edit {second_start}..{second_end} overlaps edit {first_start}..{first_end}")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}
