//! Parameter classification and body anchor computation

use crate::ast::{FunctionNode, RestParam};
use crate::error::DesugarError;
use crate::span::SourceSpan;
use std::ops::Range;

/// Partition of a parameter list plus where generated statements go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLayout {
    pub param_count: usize,
    pub default_count: usize,
    /// Parameters without a default
    pub plain: Range<usize>,
    /// Parameters aligned with the default list
    pub defaulted: Range<usize>,
    pub rest: Option<RestParam>,
    /// Offset of the first body statement, or just past `{` for an empty body
    pub anchor: usize,
    /// Whitespace run directly before the anchor
    pub indent: String,
    /// End of the last element of the parameter list
    pub list_end: Option<usize>,
    /// `,` after the last element, as in `f(a, b,)`
    pub trailing_comma: Option<SourceSpan>,
}

/// Classify the parameters of `function`
///
/// Fails when the default list is longer than the parameter list.
pub fn classify(function: &FunctionNode, source: &str) -> Result<ParamLayout, DesugarError> {
    let param_count = function.params.len();
    let default_count = function.defaults.len();
    if default_count > param_count {
        return Err(DesugarError::DefaultsExceedParams {
            line: function.line,
            defaults: default_count,
            params: param_count,
        });
    }
    let first_default = param_count - default_count;

    let open = function.body.span.start + 1;
    let anchor = function
        .body
        .first_stmt
        .map(|stmt| stmt.start)
        .unwrap_or(open);
    let between = source.get(open..anchor).ok_or(DesugarError::InvalidRange {
        start: open,
        end: anchor,
    })?;
    // Comments before the first statement stay where they are
    let indent = between[between.trim_end().len()..].to_string();

    let list_end = function
        .rest
        .as_ref()
        .map(|rest| rest.span.end)
        .or_else(|| function.defaults.last().map(|default| default.span.end))
        .or_else(|| function.params.last().map(|param| param.span.end));
    let trailing_comma = list_end.and_then(|end| find_trailing_comma(source, end));

    Ok(ParamLayout {
        param_count,
        default_count,
        plain: 0..first_default,
        defaulted: first_default..param_count,
        rest: function.rest.clone(),
        anchor,
        indent,
        list_end,
        trailing_comma,
    })
}

/// A `,` separated from `end` by whitespace only
fn find_trailing_comma(source: &str, end: usize) -> Option<SourceSpan> {
    let after = source.get(end..)?;
    let skipped = after.len() - after.trim_start().len();
    after[skipped..]
        .starts_with(',')
        .then_some(SourceSpan::new(end + skipped, end + skipped + 1))
}
