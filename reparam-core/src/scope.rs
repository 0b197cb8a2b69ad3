//! Scope registry
//!
//! Scopes form a tree owned by the registry, addressed by `ScopeId`. Syntax nodes
//! never point at scopes; functions are associated with their own scope through a
//! read-only `FunctionId -> ScopeId` map filled during discovery.
//!
//! Global invariants enforced:
//! - Append-only: scopes and bindings are never removed
//! - Binding order within a scope is insertion order

use crate::ast::FunctionId;
use crate::span::SourceSpan;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

impl ScopeKind {
    /// Whether `var` and function declarations are installed here
    pub fn is_hoist(self) -> bool {
        match self {
            ScopeKind::Module | ScopeKind::Function => true,
            ScopeKind::Block => false,
        }
    }
}

/// Declaration kind of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
}

/// Position of the parameter a generated binding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Index into the parameter list
    Index(usize),
    /// The rest parameter, which has no fixed index
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclKind,
    pub origin: SourceSpan,
    pub position: Option<Position>,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    bindings: IndexMap<String, Declaration>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.bindings.get(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.bindings.iter().map(|(name, decl)| (name.as_str(), decl))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug)]
pub struct ScopeRegistry {
    scopes: Vec<Scope>,
    functions: HashMap<FunctionId, ScopeId>,
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeRegistry {
    /// Create a registry holding only the module scope
    pub fn new() -> Self {
        ScopeRegistry {
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                parent: None,
                bindings: IndexMap::new(),
            }],
            functions: HashMap::new(),
        }
    }

    pub fn module_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            bindings: IndexMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Associate a function with the scope its body declares into
    pub fn associate(&mut self, function: FunctionId, scope: ScopeId) {
        self.functions.insert(function, scope);
    }

    pub fn scope_of(&self, function: FunctionId) -> Option<ScopeId> {
        self.functions.get(&function).copied()
    }

    /// Nearest enclosing scope (inclusive) where hoisted bindings live
    pub fn closest_hoist_scope(&self, mut id: ScopeId) -> ScopeId {
        loop {
            let scope = self.scope(id);
            if scope.kind.is_hoist() {
                return id;
            }
            match scope.parent {
                Some(parent) => id = parent,
                None => return id,
            }
        }
    }

    /// Declare a binding; an existing binding of the same name is kept
    ///
    /// Returns true when the name was new to the scope.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: DeclKind,
        origin: SourceSpan,
        position: Option<Position>,
    ) -> bool {
        let bindings = &mut self.scopes[scope.0].bindings;
        if bindings.contains_key(name) {
            return false;
        }
        bindings.insert(
            name.to_string(),
            Declaration {
                kind,
                origin,
                position,
            },
        );
        true
    }

    /// Resolve a name by walking outwards from `scope`
    pub fn lookup(&self, mut scope: ScopeId, name: &str) -> Option<(ScopeId, &Declaration)> {
        loop {
            let current = self.scope(scope);
            if let Some(decl) = current.get(name) {
                return Some((scope, decl));
            }
            scope = current.parent?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 1)
    }

    #[test]
    fn test_closest_hoist_scope_skips_blocks() {
        let mut registry = ScopeRegistry::new();
        let module = registry.module_scope();
        let function = registry.push_scope(ScopeKind::Function, module);
        let block = registry.push_scope(ScopeKind::Block, function);
        let inner = registry.push_scope(ScopeKind::Block, block);

        assert_eq!(registry.closest_hoist_scope(inner), function);
        assert_eq!(registry.closest_hoist_scope(function), function);
        assert_eq!(registry.closest_hoist_scope(module), module);
    }

    #[test]
    fn test_declare_keeps_first_binding() {
        let mut registry = ScopeRegistry::new();
        let module = registry.module_scope();
        assert!(registry.declare(module, "a", DeclKind::Var, span(), None));
        assert!(!registry.declare(module, "a", DeclKind::Let, span(), None));
        assert_eq!(registry.scope(module).get("a").map(|d| d.kind), Some(DeclKind::Var));
    }

    #[test]
    fn test_lookup_walks_outwards() {
        let mut registry = ScopeRegistry::new();
        let module = registry.module_scope();
        let function = registry.push_scope(ScopeKind::Function, module);
        registry.declare(module, "outer", DeclKind::Function, span(), None);
        registry.declare(function, "rest", DeclKind::Var, span(), Some(Position::Rest));

        let (found_in, decl) = registry.lookup(function, "outer").unwrap();
        assert_eq!(found_in, module);
        assert_eq!(decl.kind, DeclKind::Function);
        assert!(registry.lookup(module, "rest").is_none());
    }

    #[test]
    fn test_bindings_keep_insertion_order() {
        let mut registry = ScopeRegistry::new();
        let module = registry.module_scope();
        for name in ["z", "a", "m"] {
            registry.declare(module, name, DeclKind::Var, span(), None);
        }
        let names: Vec<&str> = registry.scope(module).bindings().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }
}
