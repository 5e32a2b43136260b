//! Forge-Cast: binding generator for jsii-style assemblies
//!
//! Reads an assembly (a typed IR of classes, interfaces, structs and enums
//! grouped into namespaces) and projects it into a Python package. A PHP
//! symbol layer maps the same assembly onto namespaced PHP names.
//!
//! # Architecture
//!
//! - `ir`: the assembly schema and type references
//! - `symbol`: symbols, the symbol table and identifier naming rules
//! - `model`: the per-assembly declaration model
//! - `resolver`: package names, import aliases and declaration dependencies
//! - `projection`: Python type expressions and their imports
//! - `sorter`: dependency-ordered member emission
//! - `codegen`: the Python emitter
//! - `build`: package rendering and writing
//! - `php`: the PHP symbol layer
//! - `config`: forge-cast.toml
//!
//! # Usage
//!
//! ```rust,ignore
//! use forge_cast::{Assembly, PackageBuilder};
//!
//! let assembly = Assembly::load("acme.jsii.json")?;
//! let output = PackageBuilder::new(assembly)
//!     .dependency(Assembly::load("base.jsii.json")?)
//!     .output_dir("dist/python")
//!     .build()?;
//! println!("wrote {} files", output.files.len());
//! ```

pub mod build;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod ir;
pub mod model;
pub mod php;
pub mod projection;
pub mod resolver;
pub mod sorter;
pub mod symbol;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use build::{BuildOutput, PackageBuilder};
pub use codegen::{GeneratedModule, PythonGenerator};
pub use config::{CastConfig, Target};
pub use diagnostics::{CastError, CastResult, ErrorCategory};
pub use ir::{Assembly, CastType, TypeRef, TypeSpec};
pub use model::{Declaration, Model};
pub use php::{PhpSymbol, PhpSymbols};
pub use resolver::{AliasEntry, AliasTable};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
