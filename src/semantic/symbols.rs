//! Scoped symbol tables
//!
//! All scopes of a compilation live in one arena owned by [`SymbolTable`] and
//! are addressed by [`ScopeId`]. A scope only knows its parent, so lookups
//! walk outward from the innermost scope and no scope ever enumerates its
//! children.
//!
//! Scope 0 is the root (global) scope; builtins and top-level declarations
//! live there.

use crate::parser::ast::{SourceLocation, Type};
use crate::semantic::errors::SemanticError;
use rustc_hash::FxHashMap;

/// Handle to a scope inside a [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// The signature of a declared (or builtin) function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Type>,
    pub location: SourceLocation,
}

/// What a name is bound to
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable {
        ty: Type,
        location: SourceLocation,
    },
    Function(FunctionSig),
    /// A struct type; its members live in their own scope
    Struct {
        name: String,
        members: ScopeId,
        location: SourceLocation,
    },
}

impl Symbol {
    pub fn location(&self) -> SourceLocation {
        match self {
            Symbol::Variable { location, .. } => *location,
            Symbol::Function(sig) => sig.location,
            Symbol::Struct { location, .. } => *location,
        }
    }
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
}

/// Arena of scopes with parent handles
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the (empty) root scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a new scope nested in `parent`.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            parent: Some(parent),
            symbols: FxHashMap::default(),
        });
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.0).and_then(|s| s.parent)
    }

    /// Number of scopes created so far, root included
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in `scope`. Rebinding a name of the same scope is an
    /// error reported at the new symbol's location.
    pub fn insert(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> Result<(), SemanticError> {
        let location = symbol.location();
        let Some(target) = self.scopes.get_mut(scope.0) else {
            return Err(SemanticError::UndefinedSymbol {
                name: name.to_string(),
                location,
            });
        };

        if target.symbols.contains_key(name) {
            return Err(SemanticError::DuplicateSymbol {
                name: name.to_string(),
                location,
            });
        }

        target.symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Look `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes.get(scope.0)?.symbols.get(name)
    }

    /// Look `name` up in `scope` and then in each enclosing scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.parent(id);
        }
        None
    }

    /// Like [`SymbolTable::lookup`], failing with a domain error when the
    /// name resolves nowhere.
    pub fn get(&self, scope: ScopeId, name: &str, location: SourceLocation) -> Result<&Symbol, SemanticError> {
        self.lookup(scope, name)
            .ok_or_else(|| SemanticError::UndefinedSymbol {
                name: name.to_string(),
                location,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(ty: Type, line: usize) -> Symbol {
        Symbol::Variable {
            ty,
            location: SourceLocation::new(line, 1),
        }
    }

    #[test]
    fn test_lookup_walks_outward() {
        let mut table = SymbolTable::new();
        let root = table.root();
        let inner = table.push_scope(root);
        let innermost = table.push_scope(inner);

        table.insert(root, "g", variable(Type::int(), 1)).unwrap();
        table.insert(inner, "x", variable(Type::char(), 2)).unwrap();

        assert!(table.lookup(innermost, "g").is_some());
        assert!(table.lookup(innermost, "x").is_some());
        assert!(table.lookup(root, "x").is_none());
        assert!(table.lookup_local(innermost, "g").is_none());
        assert_eq!(table.parent(innermost), Some(inner));
        assert_eq!(table.parent(root), None);
    }

    #[test]
    fn test_shadowing_is_allowed_across_scopes() {
        let mut table = SymbolTable::new();
        let root = table.root();
        let inner = table.push_scope(root);

        table.insert(root, "x", variable(Type::int(), 1)).unwrap();
        table.insert(inner, "x", variable(Type::float(), 2)).unwrap();

        match table.lookup(inner, "x") {
            Some(Symbol::Variable { ty, .. }) => assert_eq!(*ty, Type::float()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_in_same_scope_reports_second_location() {
        let mut table = SymbolTable::new();
        let root = table.root();
        table.insert(root, "x", variable(Type::int(), 1)).unwrap();

        let err = table.insert(root, "x", variable(Type::int(), 7)).unwrap_err();
        assert_eq!(
            err,
            SemanticError::DuplicateSymbol {
                name: "x".to_string(),
                location: SourceLocation::new(7, 1),
            }
        );
    }

    #[test]
    fn test_get_unknown_name() {
        let table = SymbolTable::new();
        let err = table
            .get(table.root(), "missing", SourceLocation::new(4, 2))
            .unwrap_err();
        assert!(err.to_string().contains("Symbol missing doesn't exist"));
    }
}
