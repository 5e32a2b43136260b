//! Declaration model
//!
//! [`Model`] is the per-assembly view every later stage works on: the
//! assembly (with implicit submodules filled in), a read-only index of the
//! types of its dependencies, and a [`SymbolTable`] of [`Declaration`]s for
//! every module and type of the assembly itself.
//!
//! The model is immutable once built. Emission state (which types were
//! already written, pending type-checking stubs) lives with the emitter.

mod builder;
pub mod declaration;

pub use declaration::{
    DeclKind, Declaration, EnumMemberDecl, FieldDecl, Member, MethodDecl, MethodKind, ParamDecl,
    PropertyDecl, PropertyKind, TypeMember,
};

use crate::diagnostics::{CastError, CastResult};
use crate::ir::{Assembly, CastType, InterfaceSpec, PropertySpec, TypeSpec};
use crate::resolver::package::{self, PackageName, PythonFqn};
use crate::symbol::naming::python_property_name;
use crate::symbol::{SymbolKind, SymbolTable};
use indexmap::IndexMap;
use std::collections::{BTreeSet, VecDeque};

/// Types of the dependency closure, keyed by FQN
pub type DependencyIndex = IndexMap<String, TypeSpec>;

/// The resolved view of one assembly
#[derive(Debug, Clone)]
pub struct Model {
    assembly: Assembly,
    dependencies: DependencyIndex,
    symbols: SymbolTable<Declaration>,
}

impl Model {
    /// The assembly being generated
    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// All declarations of the assembly
    pub fn symbols(&self) -> &SymbolTable<Declaration> {
        &self.symbols
    }

    /// Types of the dependency closure
    pub fn dependencies(&self) -> &DependencyIndex {
        &self.dependencies
    }

    /// Look up a local declaration
    pub fn declaration(&self, fqn: &str) -> CastResult<&Declaration> {
        self.symbols.lookup(fqn).ok_or_else(|| CastError::unknown(fqn))
    }

    /// Look up a type of the assembly or of its dependency closure
    pub fn type_spec(&self, fqn: &str) -> CastResult<&TypeSpec> {
        self.assembly
            .types
            .get(fqn)
            .or_else(|| self.dependencies.get(fqn))
            .ok_or_else(|| CastError::unknown(fqn))
    }

    /// Whether `fqn` names a struct (data-only interface), locally or in a dependency
    pub fn is_struct(&self, fqn: &str) -> bool {
        self.type_spec(fqn).map_or(false, TypeSpec::is_struct)
    }

    /// The struct behind `fqn`
    pub fn struct_spec(&self, fqn: &str) -> CastResult<&InterfaceSpec> {
        self.type_spec(fqn)?
            .as_struct()
            .ok_or_else(|| CastError::invariant(format!("Symbol {} is not of type struct", fqn)))
    }

    /// Enclosing declaration (module or type) of a local FQN
    pub fn parent(&self, fqn: &str) -> Option<&Declaration> {
        self.symbols.lookup(Declaration::namespace_of(fqn))
    }

    /// All modules, parents before children
    pub fn modules(&self) -> impl Iterator<Item = &Declaration> {
        self.symbols.of_kind(SymbolKind::Module)
    }

    /// Direct child modules of a module
    pub fn child_modules<'a>(&'a self, module: &'a Declaration) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.modules()
            .filter(move |m| m.namespace == module.fqn && m.fqn != module.fqn)
    }

    /// Python package of an FQN
    pub fn package_name(&self, fqn: &str) -> CastResult<PackageName> {
        package::package_name(fqn, &self.assembly)
    }

    /// Python FQN of an FQN
    pub fn python_fqn(&self, fqn: &str) -> CastResult<PythonFqn> {
        package::python_fqn(fqn, &self.assembly)
    }

    /// Python name of the assembly-loading module
    pub fn loader_module(&self) -> CastResult<String> {
        Ok(format!(
            "{}._jsii",
            package::root_module(&self.assembly.name, &self.assembly)?
        ))
    }

    /// All fields of a struct, inherited ones included
    ///
    /// Inherited fields come first in base order. A redeclared field keeps
    /// the position of its first declaration and the latest definition.
    pub fn struct_fields(&self, fqn: &str) -> CastResult<Vec<FieldDecl>> {
        let mut fields = IndexMap::new();
        let mut visiting = BTreeSet::new();
        self.collect_struct_fields(fqn, &mut fields, &mut visiting)?;
        Ok(fields.into_values().collect())
    }

    fn collect_struct_fields(
        &self,
        fqn: &str,
        fields: &mut IndexMap<String, FieldDecl>,
        visiting: &mut BTreeSet<String>,
    ) -> CastResult<()> {
        if !visiting.insert(fqn.to_string()) {
            return Ok(());
        }
        let spec = self.struct_spec(fqn)?;
        for base in &spec.interfaces {
            self.collect_struct_fields(base, fields, visiting)?;
        }
        for prop in &spec.properties {
            fields.insert(prop.name.clone(), field_decl(prop, fqn));
        }
        Ok(())
    }

    /// Fields lifted into keyword arguments from a struct parameter
    ///
    /// Breadth-first over the struct and its bases; the first definition of
    /// a field name wins.
    pub fn lifted_fields(&self, fqn: &str) -> CastResult<Vec<FieldDecl>> {
        let mut lifted = Vec::new();
        let mut known_structs = BTreeSet::from([fqn.to_string()]);
        let mut known_fields = BTreeSet::new();
        let mut queue = VecDeque::from([fqn.to_string()]);

        while let Some(current) = queue.pop_front() {
            let spec = self.struct_spec(&current)?;
            for base in &spec.interfaces {
                if known_structs.insert(base.clone()) {
                    queue.push_back(base.clone());
                }
            }
            for prop in &spec.properties {
                if known_fields.insert(prop.name.clone()) {
                    lifted.push(field_decl(prop, &current));
                }
            }
        }
        Ok(lifted)
    }
}

/// Struct field view of a property
pub(crate) fn field_decl(prop: &PropertySpec, defining_type: &str) -> FieldDecl {
    FieldDecl {
        python_name: python_property_name(&prop.name, false, false),
        js_name: prop.name.clone(),
        ty: CastType::from_value(&prop.ty, prop.optional),
        defining_type: defining_type.to_string(),
        docs: prop.docs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn structs() -> Assembly {
        assembly("Acme", "acme")
            .with_type(struct_type("Acme.BaseProps").with_property(prop("name", string())))
            .with_type(
                struct_type("Acme.MoreProps")
                    .with_property(prop("color", string()).optional()),
            )
            .with_type(
                struct_type("Acme.WidgetProps")
                    .with_base("Acme.BaseProps")
                    .with_base("Acme.MoreProps")
                    .with_property(prop("size", number()))
                    .with_property(prop("name", string()).optional()),
            )
    }

    #[test]
    fn test_struct_fields_inherited_first() {
        let model = Model::build(structs(), vec![]).unwrap();
        let fields = model.struct_fields("Acme.WidgetProps").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.python_name.as_str()).collect();
        assert_eq!(names, vec!["name", "color", "size"]);
        assert!(fields[0].is_optional());
        assert_eq!(fields[0].defining_type, "Acme.WidgetProps");
    }

    #[test]
    fn test_lifted_fields_breadth_first() {
        let model = Model::build(structs(), vec![]).unwrap();
        let fields = model.lifted_fields("Acme.WidgetProps").unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.js_name.as_str()).collect();
        assert_eq!(names, vec!["size", "name", "color"]);
        assert_eq!(fields[1].defining_type, "Acme.WidgetProps");
    }

    #[test]
    fn test_type_spec_falls_back_to_dependencies() {
        let dep = assembly("Base", "base_lib").with_type(struct_type("Base.Props"));
        let local = assembly("Acme", "acme").with_dependency("Base", "^1.0.0", "base_lib");
        let model = Model::build(local, vec![dep]).unwrap();

        assert!(model.is_struct("Base.Props"));
        assert!(matches!(
            model.type_spec("Nope.Thing"),
            Err(CastError::UnknownFqn { .. })
        ));
    }

    #[test]
    fn test_loader_module() {
        let model = Model::build(assembly("Acme", "acme"), vec![]).unwrap();
        assert_eq!(model.loader_module().unwrap(), "acme._jsii");
    }
}
