//! Symbols and the symbol table
//!
//! A symbol is an identity node: a normalized FQN plus a kind. Each target
//! decides how an IR FQN is normalized (the Python model keys declarations
//! by their IR FQN, the PHP layer converts to `Vendor\Package\Name`).

pub mod naming;
pub mod table;

pub use table::SymbolTable;

use serde::{Deserialize, Serialize};

/// Anything that can be registered in a [`SymbolTable`]
pub trait Symbol {
    /// Normalized fully-qualified name
    fn fqn(&self) -> &str;

    /// Variant of the symbol
    fn kind(&self) -> SymbolKind;
}

/// The kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    /// A module or namespace
    Module,
    /// A class
    Class,
    /// A behavioral interface
    Interface,
    /// A data-only interface
    Struct,
    /// An enum
    Enum,
    /// A method or function
    Method,
    /// A property
    Property,
    /// A parameter
    Parameter,
    /// A constant (enum member or const property)
    Constant,
}

impl SymbolKind {
    /// Get the display string for this kind
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Constant => "constant",
        }
    }

    /// Whether the kind declares a type
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Struct | SymbolKind::Enum
        )
    }
}
