//! Destructuring unwrapper
//!
//! Turns a binding pattern plus a textual source expression into the ordered list
//! of variable bindings that extract every leaf, and the nested definitions that
//! read leaves out of intermediate temporaries.
//!
//! Output contract:
//! - Every binding initializer reads only the source or earlier bindings
//! - Nested definitions read only temporaries introduced by bindings
//! - Values are read in source order; only trailing nested leaves stay definitions
//! - Temporaries are flagged `needs_cleanup` and `generated`
//! - Each value read through an accessor is evaluated once

use crate::ast::{ArrayPattern, ObjectPattern, Pattern, PropertyKey};
use crate::error::DesugarError;
use crate::idents::IdentifierSet;
use crate::scope::DeclKind;
use crate::span::SourceSpan;

/// Expression the pattern destructures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceExpr {
    /// Side-effect free and cheap to repeat, e.g. `arguments[1]`
    Reference(String),
    /// Must be evaluated once into a temporary before extraction
    Compound(String),
}

impl SourceExpr {
    /// Read of the call-time argument at `index`
    pub fn argument(index: usize) -> Self {
        SourceExpr::Reference(argument_read(index))
    }

    /// Argument read falling back to `default_text` when the argument is absent
    pub fn defaulted_argument(index: usize, default_text: &str) -> Self {
        let read = argument_read(index);
        SourceExpr::Compound(format!("{0} !== void 0 ? {0} : {1}", read, default_text))
    }
}

/// `arguments[index]`
pub fn argument_read(index: usize) -> String {
    format!("arguments[{}]", index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: DeclKind,
    pub init: String,
    pub needs_cleanup: bool,
    /// Introduced by the unwrapper rather than named in the pattern
    pub generated: bool,
}

impl Binding {
    fn leaf(name: &str, init: String) -> Self {
        Binding {
            name: name.to_string(),
            kind: DeclKind::Var,
            init,
            needs_cleanup: false,
            generated: false,
        }
    }
}

/// How a value is read out of its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Property(String),
    Index(usize),
    /// Key expression text, rendered inside brackets
    Computed(String),
}

impl Accessor {
    /// Member-access suffix: `.name`, `["a-b"]`, `[0]`, `[expr]`
    pub fn render(&self) -> String {
        match self {
            Accessor::Property(name) if is_identifier_name(name) => format!(".{}", name),
            Accessor::Property(name) => {
                let quoted = serde_json::Value::String(name.clone()).to_string();
                format!("[{}]", quoted)
            }
            Accessor::Index(index) => format!("[{}]", index),
            Accessor::Computed(expr) => format!("[{}]", expr),
        }
    }
}

/// `target = temporary<accessor>`, evaluated after every binding
#[derive(Debug, Clone, PartialEq)]
pub struct NestedDefinition {
    pub target: Pattern,
    pub temporary: String,
    pub accessor: Accessor,
}

/// Bindings in evaluation order, then the nested definitions that trail them
///
/// A nested leaf stays a definition only while nothing is read after it;
/// any later read turns the pending definitions into bindings first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unwrapped {
    pub bindings: Vec<Binding>,
    pub definitions: Vec<NestedDefinition>,
}

impl Unwrapped {
    fn bind(&mut self, binding: Binding) -> Result<(), DesugarError> {
        self.settle()?;
        self.bindings.push(binding);
        Ok(())
    }

    /// Move pending definitions into the bindings, keeping their order
    fn settle(&mut self) -> Result<(), DesugarError> {
        for definition in self.definitions.drain(..) {
            let Pattern::Ident(ident) = &definition.target else {
                return Err(DesugarError::NonSimpleDefinitionTarget {
                    temporary: definition.temporary,
                });
            };
            let init = format!("{}{}", definition.temporary, definition.accessor.render());
            self.bindings.push(Binding::leaf(&ident.name, init));
        }
        Ok(())
    }
}

/// Service contract consumed by the parameter emitters
pub trait Unwrapper {
    fn unwrap(
        &mut self,
        pattern: &Pattern,
        source: &SourceExpr,
        identifiers: &mut IdentifierSet,
    ) -> Result<Unwrapped, DesugarError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    /// Pattern bound directly from the source expression
    Top,
    /// Sub-pattern bound from a temporary
    Nested,
}

/// Default unwrapper; slices default and computed-key text from the file
pub struct PatternUnwrapper<'a> {
    source_text: &'a str,
    temp_prefix: String,
}

impl<'a> PatternUnwrapper<'a> {
    pub fn new(source_text: &'a str, temp_prefix: impl Into<String>) -> Self {
        PatternUnwrapper {
            source_text,
            temp_prefix: temp_prefix.into(),
        }
    }

    fn slice(&self, span: SourceSpan) -> Result<&'a str, DesugarError> {
        span.text(self.source_text)
            .ok_or(DesugarError::InvalidRange {
                start: span.start,
                end: span.end,
            })
    }

    fn temporary(
        &self,
        init: String,
        ids: &mut IdentifierSet,
        out: &mut Unwrapped,
    ) -> Result<String, DesugarError> {
        let name = ids.fresh(&self.temp_prefix);
        out.bind(Binding {
            name: name.clone(),
            kind: DeclKind::Var,
            init,
            needs_cleanup: true,
            generated: true,
        })?;
        Ok(name)
    }

    fn object(
        &self,
        object: &ObjectPattern,
        base: &str,
        depth: Depth,
        ids: &mut IdentifierSet,
        out: &mut Unwrapped,
    ) -> Result<(), DesugarError> {
        for prop in &object.props {
            let accessor = match &prop.key {
                PropertyKey::Ident(name) | PropertyKey::Str(name) => {
                    Accessor::Property(name.clone())
                }
                PropertyKey::Num(num) => Accessor::Computed(num.clone()),
                PropertyKey::Computed(span) => Accessor::Computed(self.slice(*span)?.to_string()),
            };
            self.element(&prop.value, prop.default, base, accessor, depth, ids, out)?;
        }
        Ok(())
    }

    fn array(
        &self,
        array: &ArrayPattern,
        base: &str,
        depth: Depth,
        ids: &mut IdentifierSet,
        out: &mut Unwrapped,
    ) -> Result<(), DesugarError> {
        for (index, element) in array.elements.iter().enumerate() {
            let Some(element) = element else {
                continue;
            };
            let accessor = Accessor::Index(index);
            self.element(&element.value, element.default, base, accessor, depth, ids, out)?;
        }

        if let Some(rest) = &array.rest {
            let init = format!("[].slice.call({}, {})", base, array.elements.len());
            match rest.as_ref() {
                Pattern::Ident(ident) => out.bind(Binding::leaf(&ident.name, init))?,
                nested @ (Pattern::Object(_) | Pattern::Array(_)) => {
                    let temp = self.temporary(init, ids, out)?;
                    self.sub_pattern(nested, &temp, ids, out)?;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn element(
        &self,
        value: &Pattern,
        default: Option<SourceSpan>,
        base: &str,
        accessor: Accessor,
        depth: Depth,
        ids: &mut IdentifierSet,
        out: &mut Unwrapped,
    ) -> Result<(), DesugarError> {
        let read = format!("{}{}", base, accessor.render());
        match (value, default) {
            (Pattern::Ident(ident), None) => match depth {
                Depth::Top => out.bind(Binding::leaf(&ident.name, read))?,
                Depth::Nested => out.definitions.push(NestedDefinition {
                    target: value.clone(),
                    temporary: base.to_string(),
                    accessor,
                }),
            },
            (Pattern::Ident(ident), Some(default)) => {
                let fallback = self.slice(default)?;
                let value_temp = self.temporary(read, ids, out)?;
                let init = format!("{0} === void 0 ? {1} : {0}", value_temp, fallback);
                out.bind(Binding::leaf(&ident.name, init))?;
            }
            (Pattern::Object(_) | Pattern::Array(_), default) => {
                let mut temp = self.temporary(read, ids, out)?;
                if let Some(default) = default {
                    let fallback = self.slice(default)?;
                    let init = format!("{0} === void 0 ? {1} : {0}", temp, fallback);
                    temp = self.temporary(init, ids, out)?;
                }
                self.sub_pattern(value, &temp, ids, out)?;
            }
        }
        Ok(())
    }

    fn sub_pattern(
        &self,
        pattern: &Pattern,
        temp: &str,
        ids: &mut IdentifierSet,
        out: &mut Unwrapped,
    ) -> Result<(), DesugarError> {
        match pattern {
            Pattern::Ident(ident) => out.bind(Binding::leaf(&ident.name, temp.to_string())),
            Pattern::Object(object) => self.object(object, temp, Depth::Nested, ids, out),
            Pattern::Array(array) => self.array(array, temp, Depth::Nested, ids, out),
        }
    }
}

impl Unwrapper for PatternUnwrapper<'_> {
    fn unwrap(
        &mut self,
        pattern: &Pattern,
        source: &SourceExpr,
        identifiers: &mut IdentifierSet,
    ) -> Result<Unwrapped, DesugarError> {
        let mut out = Unwrapped::default();
        let base = match source {
            SourceExpr::Reference(expr) => expr.clone(),
            SourceExpr::Compound(expr) => self.temporary(expr.clone(), identifiers, &mut out)?,
        };

        match pattern {
            Pattern::Ident(ident) => out.bind(Binding::leaf(&ident.name, base))?,
            Pattern::Object(object) => {
                self.object(object, &base, Depth::Top, identifiers, &mut out)?
            }
            Pattern::Array(array) => self.array(array, &base, Depth::Top, identifiers, &mut out)?,
        }
        Ok(out)
    }
}

/// ASCII identifier check used to choose dot access over bracket access
fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
