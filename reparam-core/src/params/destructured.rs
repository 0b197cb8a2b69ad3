//! Destructured parameters without a default

use super::render::{leaf_names, render_declaration};
use super::{ParamPass, Rewrite};
use crate::destructure::SourceExpr;
use crate::error::DesugarError;
use crate::patch::{Edit, EditKind};
use crate::scope::{DeclKind, Position};

impl ParamPass<'_> {
    /// Replace every object/array pattern before the defaulted suffix
    ///
    /// Values are read through `arguments[i]`: a removed pattern leaves no
    /// parameter name to read through.
    pub(super) fn destructured_params(&mut self, rewrite: &mut Rewrite<'_>) -> Result<(), DesugarError> {
        let function = rewrite.function;

        for index in rewrite.layout.plain.clone() {
            let param = &function.params[index];
            if !param.pattern.is_destructuring() {
                continue;
            }

            let unwrapped = self.unwrapper.unwrap(
                &param.pattern,
                &SourceExpr::argument(index),
                &mut *self.identifiers,
            )?;
            let text = render_declaration(
                &unwrapped,
                &rewrite.layout.indent,
                self.options.cleanup_temporaries,
            )?;

            for name in leaf_names(&unwrapped) {
                self.register(rewrite, name, param.span, Position::Index(index));
            }

            rewrite.mark_replaced(index)?;
            rewrite.insert(text);

            // A kept identifier parameter later in the list still needs this
            // slot, so the pattern is swapped for a placeholder name instead
            let keeps_slot = function.params[index + 1..rewrite.layout.plain.end]
                .iter()
                .any(|later| later.name().is_some());
            if keeps_slot {
                let placeholder = self.identifiers.fresh(&self.options.temp_prefix);
                self.scopes.declare(
                    rewrite.hoist,
                    &placeholder,
                    DeclKind::Param,
                    param.span,
                    Some(Position::Index(index)),
                );
                rewrite
                    .edits
                    .push(Edit::replace(param.span, placeholder, EditKind::Removal));
            } else {
                let start = rewrite.previous_end(index).unwrap_or(param.span.start);
                rewrite.remove(start, param.span.end);
            }
        }

        Ok(())
    }
}

