//! Alias table
//!
//! Every cross-module or cross-assembly reference is imported under a
//! generated alias. Aliases are derived from hashes, so two different
//! imports landing on the same alias would silently shadow each other in
//! the generated module. The table collects every alias an assembly uses
//! and checks that each one is bound to a single absolute target.
//! Relative sources are resolved against the importing module, so
//! `from .core import Engine` in `acme` and `from ..core import Engine` in
//! `acme.widgets` are the same binding.

use crate::codegen::python::PythonGenerator;
use crate::diagnostics::{CastError, CastResult};
use crate::model::Model;
use crate::projection::ImportSet;
use crate::resolver::named::absolute_import_path;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// What an alias is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    /// Absolute module the import resolves to (`base_lib`, `acme.core`)
    pub source: String,
    /// Imported item, empty for a whole-module import
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item: String,
}

impl fmt::Display for AliasEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.item.is_empty() {
            write!(f, "import {}", self.source)
        } else {
            write!(f, "from {} import {}", self.source, self.item)
        }
    }
}

/// Aliases used across the modules of an assembly
#[derive(Debug, Clone, Default, Serialize)]
pub struct AliasTable {
    aliases: BTreeMap<String, AliasEntry>,
    #[serde(skip)]
    conflicts: Vec<(String, AliasEntry, AliasEntry)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the aliases imported by every module of `model`
    pub fn collect(model: &Model) -> CastResult<Self> {
        let generator = PythonGenerator::new(model);
        let mut table = Self::new();
        for module in model.modules() {
            let module_py = model.python_fqn(&module.fqn)?.python_fqn;
            table.add_imports(&module_py, &generator.module_imports(module)?);
        }
        debug!(aliases = table.len(), conflicts = table.conflicts.len(), "alias table collected");
        Ok(table)
    }

    /// Record the aliases of an import set used by python module `module`
    pub fn add_imports(&mut self, module: &str, imports: &ImportSet) {
        for (source, items) in imports.iter() {
            for item in items {
                let aliased = if item.is_empty() { source } else { item.as_str() };
                let Some((_, alias)) = aliased.split_once(" as ") else {
                    continue;
                };
                let source = if item.is_empty() {
                    source.split_once(" as ").map_or(source, |(module, _)| module)
                } else {
                    source
                };
                let item = item.split_once(" as ").map_or("", |(name, _)| name);
                self.add(
                    alias,
                    AliasEntry {
                        source: absolute_import_path(module, source),
                        item: item.to_string(),
                    },
                );
            }
        }
    }

    /// Bind `alias`, remembering a conflict if it is bound elsewhere
    pub fn add(&mut self, alias: &str, entry: AliasEntry) {
        match self.aliases.get(alias) {
            Some(existing) if *existing != entry => {
                self.conflicts.push((alias.to_string(), existing.clone(), entry));
            }
            Some(_) => {}
            None => {
                self.aliases.insert(alias.to_string(), entry);
            }
        }
    }

    /// Fail on the first alias bound to two different imports
    pub fn verify(&self) -> CastResult<()> {
        match self.conflicts.first() {
            Some((alias, first, second)) => Err(CastError::AliasCollision {
                alias: alias.clone(),
                first: first.to_string(),
                second: second.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, alias: &str) -> Option<&AliasEntry> {
        self.aliases.get(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AliasEntry)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MethodSpec;
    use crate::test_support::*;

    #[test]
    fn test_collects_cross_module_and_cross_assembly_aliases() {
        let dep = assembly("Base", "base_lib").with_type(class("Base.Resource"));
        let acme = assembly("Acme", "acme")
            .with_dependency("Base", "^1.0.0", "base_lib")
            .with_submodule("Acme.core", None)
            .with_type(class("Acme.core.Engine"))
            .with_type(
                class("Acme.Gadget")
                    .with_base("Base.Resource")
                    .with_method(MethodSpec::new("engine").returns(named("Acme.core.Engine"))),
            );
        let model = Model::build(acme, vec![dep]).unwrap();

        let table = AliasTable::collect(&model).unwrap();
        assert_eq!(table.len(), 2);
        table.verify().unwrap();

        let (alias, entry) = table.iter().find(|(a, _)| a.starts_with("_Engine_")).unwrap();
        assert_eq!(entry.source, "acme.core");
        assert_eq!(entry.item, "Engine");
        assert_eq!(entry.to_string(), "from acme.core import Engine");
        assert_eq!(alias.len(), "_Engine_".len() + 8);

        let (_, entry) = table.iter().find(|(a, _)| a.starts_with("_base_lib_")).unwrap();
        assert_eq!(entry.to_string(), "import base_lib");
    }

    #[test]
    fn test_same_binding_twice_is_fine() {
        let mut table = AliasTable::new();
        table.add_imports("acme.widgets", &ImportSet::single("..core", "Engine as _Engine_1"));
        table.add_imports("acme.widgets", &ImportSet::single("..core", "Engine as _Engine_1"));
        assert_eq!(table.len(), 1);
        assert!(table.verify().is_ok());
    }

    #[test]
    fn test_same_target_from_different_depths_is_fine() {
        let mut table = AliasTable::new();
        table.add_imports("acme", &ImportSet::single(".core", "Engine as _Engine_1"));
        table.add_imports("acme.widgets", &ImportSet::single("..core", "Engine as _Engine_1"));
        table.add_imports("acme.widgets.deep", &ImportSet::single("...core", "Engine as _Engine_1"));
        assert_eq!(table.len(), 1);
        assert!(table.verify().is_ok());
        assert_eq!(table.get("_Engine_1").unwrap().source, "acme.core");
    }

    #[test]
    fn test_modules_at_different_depths_share_an_alias() {
        let acme = assembly("Acme", "acme")
            .with_submodule("Acme.core", None)
            .with_submodule("Acme.widgets", None)
            .with_type(class("Acme.core.Engine"))
            .with_type(
                class("Acme.Gadget")
                    .with_method(MethodSpec::new("engine").returns(named("Acme.core.Engine"))),
            )
            .with_type(
                class("Acme.widgets.Part")
                    .with_method(MethodSpec::new("engine").returns(named("Acme.core.Engine"))),
            );
        let model = Model::build(acme, vec![]).unwrap();

        let table = AliasTable::collect(&model).unwrap();
        table.verify().unwrap();
        let engines: Vec<_> = table.iter().filter(|(a, _)| a.starts_with("_Engine_")).collect();
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].1.to_string(), "from acme.core import Engine");
    }

    #[test]
    fn test_conflicting_binding_is_reported() {
        let mut table = AliasTable::new();
        table.add_imports("acme.widgets", &ImportSet::single("..core", "Engine as _Engine_1"));
        table.add_imports("acme.widgets", &ImportSet::single(".motors", "Engine as _Engine_1"));

        match table.verify() {
            Err(CastError::AliasCollision { alias, first, second }) => {
                assert_eq!(alias, "_Engine_1");
                assert_eq!(first, "from acme.core import Engine");
                assert_eq!(second, "from acme.widgets.motors import Engine");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_serializes_bindings_only() {
        let mut table = AliasTable::new();
        table.add_imports("acme", &ImportSet::single("base_lib as _base_lib_1", ""));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "aliases": { "_base_lib_1": { "source": "base_lib" } } })
        );
    }
}
