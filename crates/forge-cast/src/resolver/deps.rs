//! Structural dependencies between sibling declarations
//!
//! A type must be written after the types it inherits from when both live
//! in the same module. For nested declarations what matters is the
//! ancestor of the base that sits at the same nesting level as the
//! dependent type, so each base is climbed up to that level.

use crate::diagnostics::{CastError, CastResult};
use crate::model::{Declaration, Model};
use std::collections::BTreeSet;
use tracing::debug;

/// A sibling that must be emitted first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dependency {
    /// A type declared at the same level
    Type(String),
    /// A child module; irrelevant to ordering
    Module(String),
}

impl Dependency {
    pub fn fqn(&self) -> &str {
        match self {
            Dependency::Type(fqn) | Dependency::Module(fqn) => fqn,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Dependency::Module(_))
    }
}

/// Whether a local FQN lives inside the python module `module_py`
pub fn is_in_module(fqn: &str, model: &Model, module_py: &str) -> CastResult<bool> {
    let python = model.python_fqn(fqn)?;
    Ok(python.python_fqn.starts_with(&format!("{}.", module_py)))
}

/// Siblings that `decl` depends on, deduplicated in encounter order
pub fn depends_on(decl: &Declaration, model: &Model, module_py: &str) -> CastResult<Vec<Dependency>> {
    let own_parent = Declaration::namespace_of(&decl.fqn);
    let mut seen = BTreeSet::new();
    let mut dependencies = Vec::new();

    for base in decl.bases() {
        if model.symbols().lookup(base).is_none() || !is_in_module(base, model, module_py)? {
            continue;
        }

        let mut item = base;
        let mut parent = Declaration::namespace_of(base);
        let mut visited = BTreeSet::from([item]);
        let max_depth = base.split('.').count();
        let mut sibling_level = true;

        while parent != own_parent {
            if parent.is_empty() {
                // the base sits outside the scope enclosing `decl`
                sibling_level = false;
                break;
            }
            if !visited.insert(parent) || visited.len() > max_depth {
                return Err(CastError::invariant(format!(
                    "Could not find parent of {} at the level of {}",
                    base, decl.fqn
                )));
            }
            item = parent;
            parent = Declaration::namespace_of(item);
        }
        if !sibling_level {
            continue;
        }

        if seen.insert(item) {
            let dependency = if model.declaration(item)?.is_module() {
                Dependency::Module(item.to_string())
            } else {
                Dependency::Type(item.to_string())
            };
            dependencies.push(dependency);
        }
    }

    debug!(fqn = %decl.fqn, count = dependencies.len(), "computed dependencies");
    Ok(dependencies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn tree() -> Model {
        model(
            assembly("Acme", "acme")
                .with_submodule("Acme.core", None)
                .with_type(class("Acme.Base"))
                .with_type(class("Acme.Outer"))
                .with_type(class("Acme.Outer.Inner").with_interface("Acme.IMarker"))
                .with_type(class("Acme.Outer.Inner2").with_base("Acme.Outer.Inner"))
                .with_type(interface("Acme.IMarker"))
                .with_type(class("Acme.Derived").with_base("Acme.Outer.Inner").with_interface("Acme.Base"))
                .with_type(class("Acme.Twice").with_base("Acme.Outer.Inner").with_interface("Acme.Outer"))
                .with_type(class("Acme.core.Engine"))
                .with_type(class("Acme.UsesChild").with_base("Acme.core.Engine")),
        )
    }

    #[test]
    fn test_climbs_to_sibling_level() {
        let model = tree();
        let derived = model.declaration("Acme.Derived").unwrap();
        let deps = depends_on(derived, &model, "acme").unwrap();
        assert_eq!(
            deps,
            vec![
                Dependency::Type("Acme.Outer".into()),
                Dependency::Type("Acme.Base".into())
            ]
        );
    }

    #[test]
    fn test_deduplicates() {
        let model = tree();
        let twice = model.declaration("Acme.Twice").unwrap();
        let deps = depends_on(twice, &model, "acme").unwrap();
        assert_eq!(deps, vec![Dependency::Type("Acme.Outer".into())]);
    }

    #[test]
    fn test_nested_sibling_dependency() {
        let model = tree();
        let inner2 = model.declaration("Acme.Outer.Inner2").unwrap();
        let deps = depends_on(inner2, &model, "acme").unwrap();
        let climbed = deps.iter().map(Dependency::fqn).collect::<Vec<_>>();
        assert_eq!(climbed, vec!["Acme.Outer.Inner"]);
    }

    #[test]
    fn test_base_outside_enclosing_scope_is_skipped() {
        let model = tree();
        let inner = model.declaration("Acme.Outer.Inner").unwrap();
        assert!(depends_on(inner, &model, "acme").unwrap().is_empty());
    }

    #[test]
    fn test_child_module_base_is_module_dependency() {
        let model = tree();
        let decl = model.declaration("Acme.UsesChild").unwrap();
        let deps = depends_on(decl, &model, "acme").unwrap();
        assert_eq!(deps, vec![Dependency::Module("Acme.core".into())]);
    }

    #[test]
    fn test_foreign_bases_are_ignored() {
        let model = tree();
        let decl = model.declaration("Acme.Base").unwrap();
        assert!(depends_on(decl, &model, "acme").unwrap().is_empty());
        assert!(!is_in_module("Acme.core.Engine", &model, "acme.core.deep").unwrap());
    }
}
