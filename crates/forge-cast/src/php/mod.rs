//! PHP target
//!
//! Only the symbol layer exists for PHP: namespaced names for every type
//! and member of an assembly, with parent and interface lookups. No PHP
//! source is generated.

pub mod symbol;

pub use symbol::{normalize_fqn, PhpKind, PhpSymbol, PhpSymbols, Visibility};
