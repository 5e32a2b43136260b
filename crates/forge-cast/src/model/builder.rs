//! Model construction
//!
//! Walks the assembly once: merges dependency configuration into the
//! closure, fills in implicit submodules, turns every IR type into a
//! [`Declaration`] with target-named members, attaches nested types to
//! their enclosing declaration and registers everything in the symbol
//! table (modules first).

use super::declaration::*;
use super::{DependencyIndex, Model};
use crate::diagnostics::{CastError, CastResult};
use crate::ir::{
    Assembly, CastType, ClassSpec, DependencyConfig, EnumSpec, InterfaceSpec, MethodSpec,
    ParameterSpec, PropertySpec, SubmoduleConfig, TypeSpec,
};
use crate::symbol::naming::{python_method_name, python_property_name, to_python_identifier};
use crate::symbol::SymbolTable;
use indexmap::IndexMap;
use tracing::{debug, info};

impl Model {
    /// Build the model of `assembly`, with `dependencies` as the read-only
    /// dependency index
    pub fn build(mut assembly: Assembly, dependencies: Vec<Assembly>) -> CastResult<Model> {
        let mut index = DependencyIndex::new();
        for dep in dependencies {
            merge_dependency_config(&mut assembly, &dep);
            index.extend(dep.types);
        }
        add_implicit_submodules(&mut assembly);

        let mut model = Model {
            assembly,
            dependencies: index,
            symbols: SymbolTable::new(),
        };

        let mut decls: IndexMap<String, Declaration> = IndexMap::new();
        for module in module_declarations(&model)? {
            decls.insert(module.fqn.clone(), module);
        }
        let module_count = decls.len();

        let types: Vec<TypeSpec> = model.assembly.types.values().cloned().collect();
        for spec in &types {
            let decl = type_declaration(&model, spec)?;
            decls.insert(decl.fqn.clone(), decl);
        }

        for spec in &types {
            let parent_fqn = Declaration::namespace_of(spec.fqn()).to_string();
            let member = Member::Type(TypeMember {
                fqn: spec.fqn().to_string(),
                python_name: to_python_identifier(spec.name()),
                docs: spec.docs().cloned(),
            });
            let parent = decls
                .get_mut(&parent_fqn)
                .ok_or_else(|| CastError::unknown(parent_fqn.clone()))?;
            match parent.kind {
                DeclKind::Module { .. } | DeclKind::Class { .. } | DeclKind::Interface { .. } => {
                    parent.members.push(member)
                }
                DeclKind::Struct { .. } | DeclKind::Enum => {
                    return Err(CastError::invariant(format!(
                        "Type {} cannot be nested in {}",
                        spec.fqn(),
                        parent_fqn
                    )))
                }
            }
        }

        for (_, decl) in decls {
            model.symbols.register(decl)?;
        }

        info!(
            assembly = %model.assembly.name,
            modules = module_count,
            types = types.len(),
            dependency_types = model.dependencies.len(),
            "model built"
        );
        Ok(model)
    }
}

/// Add a dependency's target configuration to the closure, unless present
fn merge_dependency_config(assembly: &mut Assembly, dep: &Assembly) {
    if !assembly.dependency_closure.contains_key(&dep.name) {
        debug!(dependency = %dep.name, "adding dependency configuration");
        assembly.dependency_closure.insert(
            dep.name.clone(),
            DependencyConfig {
                targets: dep.targets.clone(),
                submodules: dep.submodules.clone(),
            },
        );
    }
    for (name, config) in &dep.dependency_closure {
        if *name != assembly.name {
            assembly
                .dependency_closure
                .entry(name.clone())
                .or_insert_with(|| config.clone());
        }
    }
}

/// Register namespaces that are neither types nor declared submodules
fn add_implicit_submodules(assembly: &mut Assembly) {
    let mut implicit = Vec::new();
    for spec in assembly.types.values() {
        let Some(namespace) = spec.namespace() else {
            continue;
        };
        let mut prefix = assembly.name.clone();
        for segment in namespace.split('.') {
            prefix = format!("{}.{}", prefix, segment);
            if !assembly.types.contains_key(&prefix) && !assembly.submodules.contains_key(&prefix) {
                implicit.push(prefix.clone());
            }
        }
    }
    for fqn in implicit {
        if !assembly.submodules.contains_key(&fqn) {
            debug!(submodule = %fqn, "registering implicit submodule");
            assembly.submodules.insert(fqn, SubmoduleConfig::default());
        }
    }
}

fn module_declarations(model: &Model) -> CastResult<Vec<Declaration>> {
    let assembly = &model.assembly;
    let mut modules = vec![Declaration {
        fqn: assembly.name.clone(),
        name: model.package_name(&assembly.name)?.package_name,
        namespace: String::new(),
        docs: assembly.docs.clone(),
        kind: DeclKind::Module {
            readme: assembly.readme.as_ref().map(|r| r.markdown.clone()),
        },
        members: vec![],
    }];

    for (fqn, config) in &assembly.submodules {
        modules.push(Declaration {
            fqn: fqn.clone(),
            name: model.package_name(fqn)?.package_name,
            namespace: Declaration::namespace_of(fqn).to_string(),
            docs: None,
            kind: DeclKind::Module {
                readme: config.readme.as_ref().map(|r| r.markdown.clone()),
            },
            members: vec![],
        });
    }
    Ok(modules)
}

fn type_declaration(model: &Model, spec: &TypeSpec) -> CastResult<Declaration> {
    let fqn = spec.fqn().to_string();
    debug!(fqn = %fqn, "building declaration");

    let (kind, members) = match spec {
        TypeSpec::Class(class) => class_declaration(model, class)?,
        TypeSpec::Interface(iface) if iface.datatype => struct_declaration(iface),
        TypeSpec::Interface(iface) => interface_declaration(model, iface)?,
        TypeSpec::Enum(enm) => enum_declaration(enm),
    };

    Ok(Declaration {
        namespace: Declaration::namespace_of(&fqn).to_string(),
        name: to_python_identifier(spec.name()),
        docs: spec.docs().cloned(),
        fqn,
        kind,
        members,
    })
}

fn class_declaration(model: &Model, class: &ClassSpec) -> CastResult<(DeclKind, Vec<Member>)> {
    let mut members = Vec::new();

    if let Some(init) = &class.initializer {
        members.push(Member::Method(MethodDecl {
            python_name: "__init__".to_string(),
            js_name: None,
            kind: MethodKind::Initializer,
            parameters: params(&init.parameters),
            returns: CastType::Void,
            is_abstract: false,
            lifted_struct: lifted_struct(model, &init.parameters)?,
            parent: class.fqn.clone(),
            docs: init.docs.clone(),
        }));
    }

    for method in &class.methods {
        let (python_name, kind) = if method.is_static {
            (python_method_name(&method.name, false), MethodKind::Static)
        } else if method.is_async {
            (python_method_name(&method.name, method.is_protected), MethodKind::Async)
        } else {
            (python_method_name(&method.name, method.is_protected), MethodKind::Instance)
        };
        members.push(Member::Method(method_decl(model, method, python_name, kind, &class.fqn)?));
    }

    for prop in &class.properties {
        let (python_name, kind) = if prop.is_static {
            (python_property_name(&prop.name, prop.is_const, false), PropertyKind::Static)
        } else {
            (
                python_property_name(&prop.name, prop.is_const, prop.is_protected),
                PropertyKind::Instance,
            )
        };
        members.push(Member::Property(property_decl(prop, python_name, kind, prop.is_abstract, &class.fqn)));
    }

    Ok((
        DeclKind::Class {
            base: class.base.clone(),
            interfaces: class.interfaces.clone(),
            is_abstract: class.is_abstract,
            abstract_bases: if class.is_abstract {
                abstract_bases(model, class)?
            } else {
                vec![]
            },
        },
        members,
    ))
}

/// The base class, when it is abstract itself
fn abstract_bases(model: &Model, class: &ClassSpec) -> CastResult<Vec<String>> {
    let Some(base) = &class.base else {
        return Ok(vec![]);
    };
    match model.type_spec(base)? {
        TypeSpec::Class(base_class) if base_class.is_abstract => Ok(vec![base.clone()]),
        TypeSpec::Class(_) => Ok(vec![]),
        _ => Err(CastError::invariant(format!(
            "Base {} of class {} is not a class",
            base, class.fqn
        ))),
    }
}

fn interface_declaration(model: &Model, iface: &InterfaceSpec) -> CastResult<(DeclKind, Vec<Member>)> {
    let mut members = Vec::new();
    for method in &iface.methods {
        let python_name = python_method_name(&method.name, method.is_protected);
        let mut decl = method_decl(model, method, python_name, MethodKind::Interface, &iface.fqn)?;
        decl.is_abstract = false;
        members.push(Member::Method(decl));
    }
    for prop in &iface.properties {
        let python_name = python_property_name(&prop.name, prop.is_const, prop.is_protected);
        members.push(Member::Property(property_decl(
            prop,
            python_name,
            PropertyKind::Interface,
            false,
            &iface.fqn,
        )));
    }
    Ok((
        DeclKind::Interface {
            bases: iface.interfaces.clone(),
        },
        members,
    ))
}

fn struct_declaration(iface: &InterfaceSpec) -> (DeclKind, Vec<Member>) {
    let members = iface
        .properties
        .iter()
        .map(|prop| Member::Field(super::field_decl(prop, &iface.fqn)))
        .collect();
    (
        DeclKind::Struct {
            bases: iface.interfaces.clone(),
        },
        members,
    )
}

fn enum_declaration(enm: &EnumSpec) -> (DeclKind, Vec<Member>) {
    let members = enm
        .members
        .iter()
        .map(|m| {
            Member::EnumMember(EnumMemberDecl {
                python_name: to_python_identifier(&m.name),
                value: m.name.clone(),
                docs: m.docs.clone(),
            })
        })
        .collect();
    (DeclKind::Enum, members)
}

fn method_decl(
    model: &Model,
    method: &MethodSpec,
    python_name: String,
    kind: MethodKind,
    parent: &str,
) -> CastResult<MethodDecl> {
    Ok(MethodDecl {
        python_name,
        js_name: Some(method.name.clone()),
        kind,
        parameters: params(&method.parameters),
        returns: CastType::from_returns(method.returns.as_ref()),
        is_abstract: method.is_abstract,
        lifted_struct: lifted_struct(model, &method.parameters)?,
        parent: parent.to_string(),
        docs: method.docs.clone(),
    })
}

fn property_decl(
    prop: &PropertySpec,
    python_name: String,
    kind: PropertyKind,
    is_abstract: bool,
    parent: &str,
) -> PropertyDecl {
    PropertyDecl {
        python_name,
        js_name: prop.name.clone(),
        ty: CastType::from_value(&prop.ty, prop.optional),
        kind,
        immutable: prop.immutable,
        is_abstract,
        parent: parent.to_string(),
        docs: prop.docs.clone(),
    }
}

fn params(parameters: &[ParameterSpec]) -> Vec<ParamDecl> {
    parameters
        .iter()
        .map(|p| ParamDecl {
            name: p.name.clone(),
            ty: CastType::from_value(&p.ty, p.optional),
            variadic: p.variadic,
            docs: p.docs.clone(),
        })
        .collect()
}

/// Struct whose fields become keyword arguments: the type of a trailing,
/// non-variadic, struct-typed parameter
fn lifted_struct(model: &Model, parameters: &[ParameterSpec]) -> CastResult<Option<String>> {
    let Some(last) = parameters.last() else {
        return Ok(None);
    };
    if last.variadic {
        return Ok(None);
    }
    let Some(fqn) = last.ty.fqn() else {
        return Ok(None);
    };
    Ok(model.type_spec(fqn)?.is_struct().then(|| fqn.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Docs, EnumSpec};
    use crate::symbol::{Symbol, SymbolKind};
    use crate::test_support::*;

    fn widgets() -> Assembly {
        assembly("Acme", "acme")
            .with_submodule("Acme.widgets", None)
            .with_type(struct_type("Acme.widgets.GadgetProps").with_property(prop("size", number())))
            .with_type(
                class("Acme.widgets.Gadget")
                    .with_initializer(vec![
                        param("id", string()),
                        param("props", named("Acme.widgets.GadgetProps")),
                    ])
                    .with_method(MethodSpec::new("spinAround").returns(number()))
                    .with_method(MethodSpec::new("create").static_method())
                    .with_property(prop("maxSize", number()).const_property()),
            )
            .with_type(class("Acme.widgets.Gadget.Inner"))
            .with_type(EnumSpec::new("Acme.Color", &["RED", "None"]))
    }

    #[test]
    fn test_registers_modules_then_types() {
        let model = Model::build(widgets(), vec![]).unwrap();
        let order: Vec<&str> = model.symbols().iter().map(|d| d.fqn.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "Acme",
                "Acme.widgets",
                "Acme.widgets.GadgetProps",
                "Acme.widgets.Gadget",
                "Acme.widgets.Gadget.Inner",
                "Acme.Color",
            ]
        );
        assert_eq!(model.declaration("Acme.widgets").unwrap().name, "acme.widgets");
    }

    #[test]
    fn test_members_are_target_named() {
        let model = Model::build(widgets(), vec![]).unwrap();
        let gadget = model.declaration("Acme.widgets.Gadget").unwrap();
        let names: Vec<&str> = gadget.members.iter().map(Member::python_name).collect();
        assert_eq!(names, vec!["__init__", "spin_around", "create", "MAX_SIZE", "Inner"]);

        match &gadget.members[0] {
            Member::Method(init) => {
                assert_eq!(init.kind, MethodKind::Initializer);
                assert_eq!(init.lifted_struct.as_deref(), Some("Acme.widgets.GadgetProps"));
            }
            other => panic!("expected initializer, got {:?}", other),
        }

        let color = model.declaration("Acme.Color").unwrap();
        assert_eq!(color.kind(), SymbolKind::Enum);
        let names: Vec<&str> = color.members.iter().map(Member::python_name).collect();
        assert_eq!(names, vec!["RED", "None_"]);
    }

    #[test]
    fn test_nested_type_attached_to_parent_type() {
        let model = Model::build(widgets(), vec![]).unwrap();
        let module = model.declaration("Acme.widgets").unwrap();
        let nested: Vec<&str> = module.members.iter().filter_map(Member::sortable_fqn).collect();
        assert_eq!(nested, vec!["Acme.widgets.GadgetProps", "Acme.widgets.Gadget"]);
        assert_eq!(
            model.parent("Acme.widgets.Gadget.Inner").map(|d| d.fqn.as_str()),
            Some("Acme.widgets.Gadget")
        );
    }

    #[test]
    fn test_implicit_submodule() {
        let asm = assembly("Acme", "acme").with_type(class("Acme.hidden.Thing"));
        let model = Model::build(asm, vec![]).unwrap();
        let module = model.declaration("Acme.hidden").unwrap();
        assert!(module.is_module());
        assert_eq!(module.name, "acme.hidden");
        assert_eq!(model.python_fqn("Acme.hidden.Thing").unwrap().python_fqn, "acme.hidden.Thing");
    }

    #[test]
    fn test_abstract_bases() {
        let asm = assembly("Acme", "acme")
            .with_type(class("Acme.Shape").abstract_class())
            .with_type(class("Acme.Polygon").abstract_class().with_base("Acme.Shape"))
            .with_type(class("Acme.Square").with_base("Acme.Polygon"));
        let model = Model::build(asm, vec![]).unwrap();
        match &model.declaration("Acme.Polygon").unwrap().kind {
            DeclKind::Class { abstract_bases, .. } => assert_eq!(abstract_bases, &vec!["Acme.Shape".to_string()]),
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_interface_members_are_not_abstract() {
        let asm = assembly("Acme", "acme").with_type(
            interface("Acme.IGreeter")
                .with_method(MethodSpec::new("greet").abstract_method().returns(string())),
        );
        let model = Model::build(asm, vec![]).unwrap();
        let greeter = model.declaration("Acme.IGreeter").unwrap();
        assert!(!greeter.members[0].is_abstract());
    }

    #[test]
    fn test_dependency_config_is_merged() {
        let dep = assembly("Base", "base_lib").with_submodule("Base.sub", Some("base_lib.sub_pkg"));
        let model = Model::build(assembly("Acme", "acme"), vec![dep]).unwrap();
        assert_eq!(
            model.python_fqn("Base.sub.Thing").unwrap().python_fqn,
            "base_lib.sub_pkg.Thing"
        );
    }

    #[test]
    fn test_unknown_base_is_reported() {
        let asm = assembly("Acme", "acme")
            .with_type(class("Acme.Thing").abstract_class().with_base("Other.Missing"));
        let err = Model::build(asm, vec![]).unwrap_err();
        assert_eq!(err.to_string(), "Could not locate type: \"Other.Missing\"");
    }

    #[test]
    fn test_deprecated_docs_survive() {
        let asm = assembly("Acme", "acme")
            .with_type(class("Acme.Old").with_docs(Docs::summary("old").with_deprecated("use New")));
        let model = Model::build(asm, vec![]).unwrap();
        assert!(model.declaration("Acme.Old").unwrap().is_deprecated());
    }
}
