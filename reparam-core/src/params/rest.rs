//! Trailing rest parameter

use super::{ParamPass, Rewrite};
use crate::error::DesugarError;
use crate::scope::Position;

impl ParamPass<'_> {
    /// `var rest = [].slice.call(arguments, n);` where `n` counts every
    /// positional parameter, defaulted ones included
    pub(super) fn rest_param(&mut self, rewrite: &mut Rewrite<'_>) -> Result<(), DesugarError> {
        let function = rewrite.function;
        let Some(rest) = &function.rest else {
            return Ok(());
        };

        let text = format!(
            "var {} = [].slice.call(arguments, {});{}",
            rest.name, rewrite.layout.param_count, rewrite.layout.indent
        );
        self.register(rewrite, &rest.name, rest.span, Position::Rest);
        rewrite.insert(text);

        let previous_end = function
            .defaults
            .last()
            .map(|default| default.span.end)
            .or_else(|| function.params.last().map(|param| param.span.end))
            .or_else(|| function.this_param.map(|this| this.end));
        rewrite.remove(previous_end.unwrap_or(rest.span.start), rest.span.end);
        rewrite.outcome.rest_replaced = true;

        Ok(())
    }
}
