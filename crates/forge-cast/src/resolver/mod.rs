//! Name and dependency resolution
//!
//! - [`package`]: which python package hosts an FQN.
//! - [`named`]: how a named reference is spelled at a use site, and the
//!   import it needs.
//! - [`deps`]: which sibling declarations must be written first.
//! - [`alias`]: the alias table across every module of an assembly.

pub mod alias;
pub mod deps;
pub mod named;
pub mod package;

pub use alias::{AliasEntry, AliasTable};
pub use deps::{depends_on, Dependency};
pub use named::{absolute_import_path, relative_import_path, resolve_named, ResolvedName};
pub use package::{PackageName, PythonFqn};
