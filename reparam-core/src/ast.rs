//! Parameter model for function discovery
//!
//! Global invariants enforced:
//! - Deterministic traversal order by (file, span.start)
//! - Nodes are immutable once discovered; per-run state lives with the pass
//! - Every span is a zero-based byte range into the original file text

use crate::span::SourceSpan;

/// Function identifier: (file_index, local_index)
///
/// IDs are internal only and must never appear in user output.
/// Generated deterministically during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId {
    pub file_index: usize,
    pub local_index: usize,
}

/// A function with its own `arguments` object and a block body
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub id: FunctionId,
    pub name: Option<String>,
    pub span: SourceSpan,
    /// 1-indexed line of the function start
    pub line: u32,
    /// Positional parameters, rest excluded
    pub params: Vec<Param>,
    /// Default values aligned with the tail of `params`
    pub defaults: Vec<DefaultValue>,
    pub rest: Option<RestParam>,
    /// TypeScript `this` annotation ahead of the positional parameters
    pub this_param: Option<SourceSpan>,
    pub body: BodyBlock,
}

impl FunctionNode {
    /// Name used in logs and reports
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// True when the parameter list uses any syntax this crate rewrites
    pub fn has_modern_params(&self) -> bool {
        self.rest.is_some()
            || !self.defaults.is_empty()
            || self.params.iter().any(|p| p.pattern.is_destructuring())
    }
}

/// One positional parameter
///
/// For a defaulted parameter `b = 1`, `span` covers `b` only; the default's
/// range lives in the aligned `DefaultValue`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Pattern,
    pub span: SourceSpan,
}

impl Param {
    /// Name of a plain identifier parameter
    pub fn name(&self) -> Option<&str> {
        match &self.pattern {
            Pattern::Ident(ident) => Some(&ident.name),
            Pattern::Object(_) | Pattern::Array(_) => None,
        }
    }
}

/// Binding target shape
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(Identifier),
    Object(ObjectPattern),
    Array(ArrayPattern),
}

impl Pattern {
    pub fn is_destructuring(&self) -> bool {
        match self {
            Pattern::Ident(_) => false,
            Pattern::Object(_) | Pattern::Array(_) => true,
        }
    }

    /// Shorthand used by tests and the unwrapper for leaf targets
    pub fn ident(name: impl Into<String>, span: SourceSpan) -> Self {
        Pattern::Ident(Identifier {
            name: name.into(),
            span,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    pub span: SourceSpan,
    pub props: Vec<ObjectPatternProp>,
}

/// `key: value = default`, `key = default` or shorthand `key`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProp {
    pub key: PropertyKey,
    pub value: Pattern,
    pub default: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Ident(String),
    Str(String),
    Num(String),
    /// `[expr]`; the span covers `expr` only
    Computed(SourceSpan),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    pub span: SourceSpan,
    /// `None` marks a hole (`[, b]`)
    pub elements: Vec<Option<ArrayElement>>,
    /// Trailing `...rest` element, bound from index `elements.len()`
    pub rest: Option<Box<Pattern>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElement {
    pub value: Pattern,
    pub default: Option<SourceSpan>,
}

/// Default value expression of a defaulted parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub span: SourceSpan,
    /// Set when the expression is a bare identifier
    pub ident: Option<String>,
}

/// Trailing variadic parameter; `span` includes the `...` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestParam {
    pub name: String,
    pub span: SourceSpan,
}

/// Function body block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBlock {
    /// Covers the braces
    pub span: SourceSpan,
    pub first_stmt: Option<SourceSpan>,
}
