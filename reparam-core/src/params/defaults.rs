//! Defaulted parameters, plain and destructured

use super::render::{leaf_names, render_declaration};
use super::{ParamPass, Rewrite};
use crate::ast::Pattern;
use crate::destructure::{argument_read, SourceExpr};
use crate::diagnostics::WarningKind;
use crate::error::DesugarError;
use crate::scope::Position;

impl ParamPass<'_> {
    /// Replace the defaulted suffix, left to right
    pub(super) fn defaulted_params(&mut self, rewrite: &mut Rewrite<'_>) -> Result<(), DesugarError> {
        let function = rewrite.function;
        let first_default = rewrite.layout.defaulted.start;

        for (offset, default) in function.defaults.iter().enumerate() {
            let index = first_default + offset;
            let param = &function.params[index];
            let default_text = self.slice(default.span)?;

            let text = match &param.pattern {
                Pattern::Ident(ident) => {
                    if default.ident.as_deref() == Some(ident.name.as_str()) {
                        self.diagnostics.warn(
                            function.line,
                            WarningKind::SelfReferentialDefault {
                                name: ident.name.clone(),
                            },
                        );
                    }
                    self.register(rewrite, &ident.name, default.span, Position::Index(index));
                    format!(
                        "var {0} = {1}; if ({0} === void 0) {0} = {2};{3}",
                        ident.name,
                        argument_read(index),
                        default_text,
                        rewrite.layout.indent
                    )
                }
                pattern @ (Pattern::Object(_) | Pattern::Array(_)) => {
                    let source = SourceExpr::defaulted_argument(index, default_text);
                    let unwrapped =
                        self.unwrapper
                            .unwrap(pattern, &source, &mut *self.identifiers)?;
                    for name in leaf_names(&unwrapped) {
                        self.register(rewrite, name, default.span, Position::Index(index));
                    }
                    render_declaration(
                        &unwrapped,
                        &rewrite.layout.indent,
                        self.options.cleanup_temporaries,
                    )?
                }
            };

            rewrite.mark_replaced(index)?;
            rewrite.insert(text);

            // Swallow the separator after whichever came last: the previous
            // parameter or the previous default
            let previous_param = rewrite.previous_end(index);
            let previous_default = offset
                .checked_sub(1)
                .map(|d| function.defaults[d].span.end);
            let start = previous_param
                .into_iter()
                .chain(previous_default)
                .max()
                .unwrap_or(param.span.start);
            rewrite.remove(start, default.span.end);
        }

        Ok(())
    }
}
