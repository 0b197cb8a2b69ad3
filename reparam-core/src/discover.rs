//! Function and scope discovery from AST
//!
//! Global invariants enforced:
//! - Deterministic traversal order by (file, span.start)
//! - Every discovered function is associated with its own function scope
//! - Every identifier in the file is recorded in the run-scoped identifier set
//!
//! Rewrite candidates (own `arguments` object and a block body):
//! - Function declarations (`FnDecl`) and expressions (`FnExpr`)
//! - Class methods (`ClassMethod`, `PrivateMethod`) of kind method
//! - Object literal methods (`MethodProp`)
//!
//! Scoped but never rewritten:
//! - Arrow functions, getters, setters and constructors
//! - Overload signatures without bodies

use crate::ast::{
    ArrayElement, ArrayPattern, BodyBlock, DefaultValue, FunctionId, FunctionNode, Identifier,
    ObjectPattern, ObjectPatternProp, Param, Pattern, PropertyKey, RestParam,
};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::idents::IdentifierSet;
use crate::scope::{DeclKind, Position, ScopeId, ScopeKind, ScopeRegistry};
use crate::span::SourceSpan;
use swc_common::{BytePos, SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Functions of one file plus the scope tree they live in
#[derive(Debug)]
pub struct Discovery {
    pub functions: Vec<FunctionNode>,
    pub scopes: ScopeRegistry,
}

/// Collect rewrite candidates and scopes from a module
///
/// Returns functions sorted deterministically by span start position. Functions
/// whose parameters cannot be rewritten are reported to `diagnostics` and left
/// out.
pub fn discover_functions(
    module: &Module,
    file_index: usize,
    base: BytePos,
    source_map: &SourceMap,
    identifiers: &mut IdentifierSet,
    diagnostics: &mut Diagnostics,
) -> Discovery {
    let scopes = ScopeRegistry::new();
    let module_scope = scopes.module_scope();
    let mut collector = FunctionCollector {
        file_index,
        base,
        source_map,
        scopes,
        stack: vec![module_scope],
        identifiers,
        diagnostics,
        found: Vec::new(),
        sealed: 0,
    };

    module.visit_with(&mut collector);

    let FunctionCollector {
        mut found,
        mut scopes,
        ..
    } = collector;

    // Sort by span start for deterministic ordering
    found.sort_by_key(|(function, _)| function.span.start);

    let functions = found
        .into_iter()
        .enumerate()
        .map(|(idx, (mut function, scope))| {
            function.id = FunctionId {
                file_index,
                local_index: idx,
            };
            scopes.associate(function.id, scope);
            function
        })
        .collect();

    Discovery { functions, scopes }
}

/// Positional parameters, defaults and rest of one parameter list
#[derive(Default)]
struct ParamList {
    params: Vec<Param>,
    defaults: Vec<DefaultValue>,
    rest: Option<RestParam>,
    this_param: Option<SourceSpan>,
}

/// Visitor building function nodes and scopes
struct FunctionCollector<'a> {
    file_index: usize,
    base: BytePos,
    source_map: &'a SourceMap,
    scopes: ScopeRegistry,
    /// Innermost scope last; never empty
    stack: Vec<ScopeId>,
    identifiers: &'a mut IdentifierSet,
    diagnostics: &'a mut Diagnostics,
    found: Vec<(FunctionNode, ScopeId)>,
    /// Depth inside parameter lists that are going to be rewritten
    sealed: usize,
}

impl FunctionCollector<'_> {
    fn current(&self) -> ScopeId {
        self.stack
            .last()
            .copied()
            .unwrap_or_else(|| self.scopes.module_scope())
    }

    fn enter(&mut self, kind: ScopeKind) -> ScopeId {
        let scope = self.scopes.push_scope(kind, self.current());
        self.stack.push(scope);
        scope
    }

    fn leave(&mut self) {
        self.stack.pop();
    }

    fn span(&self, span: Span) -> SourceSpan {
        SourceSpan::from_swc(span, self.base)
    }

    fn line(&self, span: Span) -> u32 {
        self.source_map.lookup_char_pos(span.lo).line as u32
    }

    /// Span of a parameter pattern including its type annotation
    fn pat_span(&self, pat: &Pat) -> SourceSpan {
        let span = pat.span();
        let type_ann = match pat {
            Pat::Ident(binding) => binding.type_ann.as_ref(),
            Pat::Array(array) => array.type_ann.as_ref(),
            Pat::Object(object) => object.type_ann.as_ref(),
            Pat::Rest(rest) => rest.type_ann.as_ref(),
            _ => None,
        };
        let hi = type_ann.map_or(span.hi, |ann| ann.span.hi.max(span.hi));
        self.span(Span::new(span.lo, hi))
    }

    fn declare(&mut self, scope: ScopeId, ident: &Ident, kind: DeclKind, position: Option<Position>) {
        let origin = self.span(ident.span);
        self.scopes
            .declare(scope, &ident.sym, kind, origin, position);
    }

    fn declare_pat(&mut self, scope: ScopeId, pat: &Pat, kind: DeclKind, position: Option<Position>) {
        let mut names = Vec::new();
        binding_idents(pat, &mut names);
        for ident in names {
            self.declare(scope, ident, kind, position);
        }
    }

    fn declare_param(&mut self, pat: &Pat, index: usize) {
        let position = match pat {
            Pat::Rest(_) => Position::Rest,
            _ => Position::Index(index),
        };
        let scope = self.current();
        self.declare_pat(scope, pat, DeclKind::Param, Some(position));
    }

    fn visit_body(&mut self, body: &BlockStmt) {
        for stmt in &body.stmts {
            stmt.visit_with(self);
        }
    }

    fn skip(&mut self, name: Option<&str>, line: u32, reason: &str) {
        self.diagnostics.warn(
            line,
            WarningKind::SkippedFunction {
                function: name.unwrap_or("<anonymous>").to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// Scope a function and, for candidates, record its node
    fn function_like(&mut self, name: Option<String>, outer: Span, function: &Function, candidate: bool) {
        let Some(body) = &function.body else {
            return;
        };

        let scope = self.scopes.push_scope(ScopeKind::Function, self.current());
        let mut rewrites = false;
        if candidate {
            match self.function_node(name.clone(), outer, function, body) {
                Ok(node) if self.sealed > 0 => {
                    // Its text moves with the enclosing default into the body
                    if node.has_modern_params() {
                        let line = node.line;
                        self.skip(name.as_deref(), line, "nested inside a rewritten parameter list");
                    }
                }
                Ok(node) => {
                    rewrites = node.has_modern_params();
                    self.found.push((node, scope));
                }
                Err(reason) => {
                    let line = self.line(outer);
                    self.skip(name.as_deref(), line, reason);
                }
            }
        }

        self.stack.push(scope);
        // Parameters that get rewritten are registered by the rewrite itself
        for (index, param) in function.params.iter().enumerate() {
            if !rewrites || matches!(param.pat, Pat::Ident(_)) {
                self.declare_param(&param.pat, index);
            }
        }
        if rewrites {
            self.sealed += 1;
        }
        for param in &function.params {
            param.visit_with(self);
        }
        if rewrites {
            self.sealed -= 1;
        }
        self.visit_body(body);
        self.leave();
    }

    fn function_node(
        &self,
        name: Option<String>,
        outer: Span,
        function: &Function,
        body: &BlockStmt,
    ) -> Result<FunctionNode, &'static str> {
        let ParamList {
            params,
            defaults,
            rest,
            this_param,
        } = self.param_list(&function.params)?;

        Ok(FunctionNode {
            id: FunctionId {
                file_index: self.file_index,
                local_index: 0,
            },
            name,
            span: self.span(outer),
            line: self.line(outer),
            params,
            defaults,
            rest,
            this_param,
            body: BodyBlock {
                span: self.span(body.span),
                first_stmt: body.stmts.first().map(|stmt| self.span(stmt.span())),
            },
        })
    }

    fn param_list(&self, params: &[swc_ecma_ast::Param]) -> Result<ParamList, &'static str> {
        let mut list = ParamList::default();
        for (index, param) in params.iter().enumerate() {
            match &param.pat {
                // TypeScript `this` parameter, erased before runtime
                Pat::Ident(binding) if index == 0 && &*binding.id.sym == "this" => {
                    list.this_param = Some(self.pat_span(&param.pat));
                }
                Pat::Rest(rest) => {
                    let Pat::Ident(binding) = &*rest.arg else {
                        return Err("rest parameter binds a pattern");
                    };
                    list.rest = Some(RestParam {
                        name: binding.id.sym.to_string(),
                        span: self.pat_span(&param.pat),
                    });
                }
                Pat::Assign(assign) => {
                    list.params.push(Param {
                        pattern: self.pattern(&assign.left)?,
                        span: self.pat_span(&assign.left),
                    });
                    let ident = match &*assign.right {
                        Expr::Ident(ident) => Some(ident.sym.to_string()),
                        _ => None,
                    };
                    list.defaults.push(DefaultValue {
                        span: self.span(assign.right.span()),
                        ident,
                    });
                }
                pat => {
                    if !list.defaults.is_empty() {
                        return Err("parameter without a default follows a defaulted parameter");
                    }
                    list.params.push(Param {
                        pattern: self.pattern(pat)?,
                        span: self.pat_span(pat),
                    });
                }
            }
        }
        Ok(list)
    }

    fn pattern(&self, pat: &Pat) -> Result<Pattern, &'static str> {
        match pat {
            Pat::Ident(binding) => Ok(Pattern::Ident(Identifier {
                name: binding.id.sym.to_string(),
                span: self.span(binding.id.span),
            })),
            Pat::Object(object) => {
                let mut props = Vec::with_capacity(object.props.len());
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(key_value) => {
                            let (value, default) = self.element(&key_value.value)?;
                            props.push(ObjectPatternProp {
                                key: self.property_key(&key_value.key)?,
                                value,
                                default,
                            });
                        }
                        ObjectPatProp::Assign(assign) => {
                            let name = assign.key.id.sym.to_string();
                            props.push(ObjectPatternProp {
                                key: PropertyKey::Ident(name.clone()),
                                value: Pattern::ident(name, self.span(assign.key.id.span)),
                                default: assign.value.as_ref().map(|value| self.span(value.span())),
                            });
                        }
                        _ => return Err("object rest element in a parameter pattern"),
                    }
                }
                Ok(Pattern::Object(ObjectPattern {
                    span: self.span(object.span),
                    props,
                }))
            }
            Pat::Array(array) => {
                let mut elements = Vec::with_capacity(array.elems.len());
                let mut rest = None;
                for elem in &array.elems {
                    match elem {
                        None => elements.push(None),
                        Some(Pat::Rest(rest_pat)) => {
                            rest = Some(Box::new(self.pattern(&rest_pat.arg)?));
                        }
                        Some(pat) => {
                            let (value, default) = self.element(pat)?;
                            elements.push(Some(ArrayElement { value, default }));
                        }
                    }
                }
                Ok(Pattern::Array(ArrayPattern {
                    span: self.span(array.span),
                    elements,
                    rest,
                }))
            }
            _ => Err("unsupported binding target in a parameter"),
        }
    }

    /// Pattern element with its optional default
    fn element(&self, pat: &Pat) -> Result<(Pattern, Option<SourceSpan>), &'static str> {
        match pat {
            Pat::Assign(assign) => Ok((
                self.pattern(&assign.left)?,
                Some(self.span(assign.right.span())),
            )),
            pat => Ok((self.pattern(pat)?, None)),
        }
    }

    fn property_key(&self, key: &PropName) -> Result<PropertyKey, &'static str> {
        match key {
            PropName::Ident(ident) => Ok(PropertyKey::Ident(ident.sym.to_string())),
            PropName::Str(str_lit) => Ok(PropertyKey::Str(str_lit.value.to_atom_lossy().to_string())),
            PropName::Num(num) => Ok(PropertyKey::Num(num.to_string())),
            PropName::Computed(computed) => Ok(PropertyKey::Computed(self.span(computed.expr.span()))),
            _ => Err("bigint property key in a parameter pattern"),
        }
    }
}

impl Visit for FunctionCollector<'_> {
    fn visit_ident(&mut self, ident: &Ident) {
        self.identifiers.insert(ident.sym.to_string());
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.identifiers.insert(decl.ident.sym.to_string());
        let hoist = self.scopes.closest_hoist_scope(self.current());
        self.declare(hoist, &decl.ident, DeclKind::Function, None);

        let name = Some(decl.ident.sym.to_string());
        self.function_like(name, decl.function.span, &decl.function, true);
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        if let Some(ident) = &expr.ident {
            self.identifiers.insert(ident.sym.to_string());
        }
        let name = expr.ident.as_ref().map(|id| id.sym.to_string());
        self.function_like(name, expr.function.span, &expr.function, true);
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        method.key.visit_with(self);
        let candidate = matches!(method.kind, MethodKind::Method);
        self.function_like(prop_name(&method.key), method.span, &method.function, candidate);
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        let candidate = matches!(method.kind, MethodKind::Method);
        let name = Some(format!("#{}", method.key.name));
        self.function_like(name, method.span, &method.function, candidate);
    }

    fn visit_method_prop(&mut self, prop: &MethodProp) {
        prop.key.visit_with(self);
        self.function_like(prop_name(&prop.key), prop.function.span, &prop.function, true);
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.enter(ScopeKind::Function);
        for (index, pat) in arrow.params.iter().enumerate() {
            self.declare_param(pat, index);
            pat.visit_with(self);
        }
        match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(body) => self.visit_body(body),
            BlockStmtOrExpr::Expr(expr) => expr.visit_with(self),
        }
        self.leave();
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        getter.key.visit_with(self);
        self.enter(ScopeKind::Function);
        if let Some(body) = &getter.body {
            self.visit_body(body);
        }
        self.leave();
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        setter.key.visit_with(self);
        self.enter(ScopeKind::Function);
        self.declare_param(&setter.param, 0);
        setter.param.visit_with(self);
        if let Some(body) = &setter.body {
            self.visit_body(body);
        }
        self.leave();
    }

    fn visit_constructor(&mut self, constructor: &Constructor) {
        self.enter(ScopeKind::Function);
        for (index, param) in constructor.params.iter().enumerate() {
            if let ParamOrTsParamProp::Param(param) = param {
                self.declare_param(&param.pat, index);
            }
            param.visit_with(self);
        }
        if let Some(body) = &constructor.body {
            self.visit_body(body);
        }
        self.leave();
    }

    fn visit_block_stmt(&mut self, block: &BlockStmt) {
        self.enter(ScopeKind::Block);
        block.visit_children_with(self);
        self.leave();
    }

    fn visit_catch_clause(&mut self, clause: &CatchClause) {
        let scope = self.enter(ScopeKind::Block);
        if let Some(param) = &clause.param {
            self.declare_pat(scope, param, DeclKind::Let, None);
            param.visit_with(self);
        }
        self.visit_body(&clause.body);
        self.leave();
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        let (kind, scope) = match decl.kind {
            VarDeclKind::Var => (
                DeclKind::Var,
                self.scopes.closest_hoist_scope(self.current()),
            ),
            VarDeclKind::Let => (DeclKind::Let, self.current()),
            _ => (DeclKind::Const, self.current()),
        };
        for declarator in &decl.decls {
            self.declare_pat(scope, &declarator.name, kind, None);
        }
        decl.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        let scope = self.current();
        self.declare(scope, &decl.ident, DeclKind::Class, None);
        decl.visit_children_with(self);
    }
}

/// Name used for methods in logs and warnings
fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        PropName::Num(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Identifiers bound by a pattern, in source order
fn binding_idents<'p>(pat: &'p Pat, out: &mut Vec<&'p Ident>) {
    match pat {
        Pat::Ident(binding) => out.push(&binding.id),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                binding_idents(elem, out);
            }
        }
        Pat::Rest(rest) => binding_idents(&rest.arg, out),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(key_value) => binding_idents(&key_value.value, out),
                    ObjectPatProp::Assign(assign) => out.push(&assign.key.id),
                    ObjectPatProp::Rest(rest) => binding_idents(&rest.arg, out),
                }
            }
        }
        Pat::Assign(assign) => binding_idents(&assign.left, out),
        _ => {}
    }
}
