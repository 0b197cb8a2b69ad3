//! Declaration rendering shared by the destructuring emitters

use crate::ast::Pattern;
use crate::destructure::{NestedDefinition, Unwrapped};
use crate::error::DesugarError;

/// `var a = x, b = y, c = $D0.c;` then cleanups, then `indent`
pub(super) fn render_declaration(
    unwrapped: &Unwrapped,
    indent: &str,
    cleanup: bool,
) -> Result<String, DesugarError> {
    let mut items: Vec<String> = unwrapped
        .bindings
        .iter()
        .map(|binding| format!("{} = {}", binding.name, binding.init))
        .collect();
    for definition in &unwrapped.definitions {
        items.push(definition_to_string(definition)?);
    }

    let mut text = String::new();
    if !items.is_empty() {
        text.push_str("var ");
        text.push_str(&items.join(", "));
        text.push(';');
    }
    if cleanup {
        for binding in unwrapped.bindings.iter().filter(|b| b.needs_cleanup) {
            text.push_str(&binding.name);
            text.push_str(" = null;");
        }
    }
    text.push_str(indent);
    Ok(text)
}

/// `name = temporary<accessor>`
pub(super) fn definition_to_string(definition: &NestedDefinition) -> Result<String, DesugarError> {
    match &definition.target {
        Pattern::Ident(ident) => Ok(format!(
            "{} = {}{}",
            ident.name,
            definition.temporary,
            definition.accessor.render()
        )),
        Pattern::Object(_) | Pattern::Array(_) => Err(DesugarError::NonSimpleDefinitionTarget {
            temporary: definition.temporary.clone(),
        }),
    }
}

/// Names the user wrote in the pattern, in declaration order
pub(super) fn leaf_names(unwrapped: &Unwrapped) -> Vec<&str> {
    let bindings = unwrapped
        .bindings
        .iter()
        .filter(|binding| !binding.generated)
        .map(|binding| binding.name.as_str());
    let definitions = unwrapped
        .definitions
        .iter()
        .filter_map(|definition| match &definition.target {
            Pattern::Ident(ident) => Some(ident.name.as_str()),
            Pattern::Object(_) | Pattern::Array(_) => None,
        });
    bindings.chain(definitions).collect()
}
