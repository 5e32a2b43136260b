//! FQN-keyed symbol table
//!
//! One table is built per assembly and generation pass, then passed by
//! reference to everything that needs lookups. Registration refuses to
//! overwrite: two declarations normalizing to the same FQN are reported as
//! [`CastError::SymbolCollision`] instead of silently shadowing each other.

use super::{Symbol, SymbolKind};
use crate::diagnostics::{CastError, CastResult};
use indexmap::IndexMap;
use tracing::debug;

/// Mapping from normalized FQN to symbol, in registration order
#[derive(Debug, Clone)]
pub struct SymbolTable<S> {
    symbols: IndexMap<String, S>,
}

impl<S> Default for SymbolTable<S> {
    fn default() -> Self {
        Self {
            symbols: IndexMap::new(),
        }
    }
}

impl<S: Symbol> SymbolTable<S> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol under its FQN
    pub fn register(&mut self, symbol: S) -> CastResult<()> {
        let fqn = symbol.fqn().to_string();
        if self.symbols.contains_key(&fqn) {
            return Err(CastError::SymbolCollision { fqn });
        }
        debug!(fqn = %fqn, kind = symbol.kind().display(), "registered symbol");
        self.symbols.insert(fqn, symbol);
        Ok(())
    }

    /// Look up a symbol of any kind
    pub fn lookup(&self, fqn: &str) -> Option<&S> {
        self.symbols.get(fqn)
    }

    /// Look up a symbol, only if it is of the requested kind
    pub fn lookup_of_kind(&self, fqn: &str, kind: SymbolKind) -> Option<&S> {
        self.lookup(fqn).filter(|s| s.kind() == kind)
    }

    /// Look up a symbol the IR guarantees to exist with the given kind
    ///
    /// A miss is an internal invariant violation, not a user error.
    pub fn require(&self, fqn: &str, kind: SymbolKind) -> CastResult<&S> {
        let symbol = self
            .lookup(fqn)
            .ok_or_else(|| CastError::invariant(format!("Symbol {} does not exist", fqn)))?;
        if symbol.kind() != kind {
            return Err(CastError::invariant(format!(
                "Symbol {} is not of type {}",
                fqn,
                kind.display()
            )));
        }
        Ok(symbol)
    }

    /// All symbols of one kind, in registration order
    pub fn of_kind(&self, kind: SymbolKind) -> impl Iterator<Item = &S> {
        self.symbols.values().filter(move |s| s.kind() == kind)
    }

    /// Whether an FQN is registered
    pub fn contains(&self, fqn: &str) -> bool {
        self.symbols.contains_key(fqn)
    }

    /// All symbols, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.symbols.values()
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
