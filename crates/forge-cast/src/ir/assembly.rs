//! Assembly schema
//!
//! The read-only input of a generation run: one assembly with its types,
//! submodule layout and the target configuration of every assembly in its
//! dependency closure. The shapes follow the jsii assembly format.

use super::docs::Docs;
use crate::diagnostics::CastResult;
use super::types::{OptionalValue, TypeRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A versioned unit of the IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<Readme>,
    #[serde(default)]
    pub targets: Targets,
    #[serde(default)]
    pub submodules: BTreeMap<String, SubmoduleConfig>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dependency_closure: BTreeMap<String, DependencyConfig>,
    #[serde(default)]
    pub types: IndexMap<String, TypeSpec>,
}

impl Assembly {
    /// Create an empty assembly mapped to a python root module
    pub fn new(name: impl Into<String>, version: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            docs: None,
            readme: None,
            targets: Targets::python(module),
            submodules: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            dependency_closure: BTreeMap::new(),
            types: IndexMap::new(),
        }
    }

    /// Add a type
    pub fn with_type(mut self, ty: impl Into<TypeSpec>) -> Self {
        let ty = ty.into();
        self.types.insert(ty.fqn().to_string(), ty);
        self
    }

    /// Add a submodule, optionally mapped to an explicit python package
    pub fn with_submodule(mut self, fqn: impl Into<String>, python: Option<&str>) -> Self {
        let targets = match python {
            Some(module) => Targets::python(module),
            None => Targets::default(),
        };
        self.submodules.insert(
            fqn.into(),
            SubmoduleConfig {
                targets,
                readme: None,
            },
        );
        self
    }

    /// Add a direct dependency together with its target configuration
    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>, module: impl Into<String>) -> Self {
        let name = name.into();
        self.dependencies.insert(name.clone(), version.into());
        self.dependency_closure.insert(
            name,
            DependencyConfig {
                targets: Targets::python(module),
                submodules: BTreeMap::new(),
            },
        );
        self
    }

    /// Root python module, if configured
    pub fn python_module(&self) -> Option<&str> {
        self.targets.python.as_ref().map(|p| p.module.as_str())
    }

    /// Python distribution name (falls back to the root module)
    pub fn dist_name(&self) -> String {
        self.targets
            .python
            .as_ref()
            .and_then(|p| p.dist_name.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    /// File name of the packaged assembly the runtime loads
    pub fn tarball_name(&self) -> String {
        format!(
            "{}@{}.jsii.tgz",
            self.name.trim_start_matches('@').replace('/', "-"),
            self.version
        )
    }

    /// Parse an assembly from its JSON form
    pub fn from_json(json: &str) -> CastResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read an assembly file
    pub fn load(path: impl AsRef<Path>) -> CastResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let assembly = Self::from_json(&json)?;
        debug!(assembly = %assembly.name, path = %path.display(), "assembly loaded");
        Ok(assembly)
    }
}

/// Per-target configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<PythonTarget>,
}

impl Targets {
    /// Targets with only a python module
    pub fn python(module: impl Into<String>) -> Self {
        Targets {
            python: Some(PythonTarget {
                module: module.into(),
                dist_name: None,
            }),
        }
    }
}

/// Python target configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonTarget {
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_name: Option<String>,
}

/// Submodule configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmoduleConfig {
    #[serde(default)]
    pub targets: Targets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<Readme>,
}

/// Target configuration of an assembly in the dependency closure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    #[serde(default)]
    pub targets: Targets,
    #[serde(default)]
    pub submodules: BTreeMap<String, SubmoduleConfig>,
}

/// Markdown readme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readme {
    pub markdown: String,
}

/// A type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSpec {
    Class(ClassSpec),
    Interface(InterfaceSpec),
    Enum(EnumSpec),
}

impl TypeSpec {
    /// Fully-qualified name
    pub fn fqn(&self) -> &str {
        match self {
            TypeSpec::Class(c) => &c.fqn,
            TypeSpec::Interface(i) => &i.fqn,
            TypeSpec::Enum(e) => &e.fqn,
        }
    }

    /// Unqualified name
    pub fn name(&self) -> &str {
        match self {
            TypeSpec::Class(c) => &c.name,
            TypeSpec::Interface(i) => &i.name,
            TypeSpec::Enum(e) => &e.name,
        }
    }

    /// Owning assembly
    pub fn assembly(&self) -> &str {
        match self {
            TypeSpec::Class(c) => &c.assembly,
            TypeSpec::Interface(i) => &i.assembly,
            TypeSpec::Enum(e) => &e.assembly,
        }
    }

    /// Namespace relative to the assembly, if any
    pub fn namespace(&self) -> Option<&str> {
        match self {
            TypeSpec::Class(c) => c.namespace.as_deref(),
            TypeSpec::Interface(i) => i.namespace.as_deref(),
            TypeSpec::Enum(e) => e.namespace.as_deref(),
        }
    }

    /// Documentation
    pub fn docs(&self) -> Option<&Docs> {
        match self {
            TypeSpec::Class(c) => c.docs.as_ref(),
            TypeSpec::Interface(i) => i.docs.as_ref(),
            TypeSpec::Enum(e) => e.docs.as_ref(),
        }
    }

    /// The struct behind this type, if it is a data-only interface
    pub fn as_struct(&self) -> Option<&InterfaceSpec> {
        match self {
            TypeSpec::Interface(i) if i.datatype => Some(i),
            _ => None,
        }
    }

    /// Whether this type is a data-only interface
    pub fn is_struct(&self) -> bool {
        self.as_struct().is_some()
    }
}

impl From<ClassSpec> for TypeSpec {
    fn from(value: ClassSpec) -> Self {
        TypeSpec::Class(value)
    }
}

impl From<InterfaceSpec> for TypeSpec {
    fn from(value: InterfaceSpec) -> Self {
        TypeSpec::Interface(value)
    }
}

impl From<EnumSpec> for TypeSpec {
    fn from(value: EnumSpec) -> Self {
        TypeSpec::Enum(value)
    }
}

/// Split `Assembly.Ns.Name` into (assembly, namespace, name)
fn split_fqn(fqn: &str) -> (String, Option<String>, String) {
    let mut parts: Vec<&str> = fqn.split('.').collect();
    let name = parts.pop().unwrap_or_default().to_string();
    let assembly = if parts.is_empty() {
        String::new()
    } else {
        parts.remove(0).to_string()
    };
    let namespace = if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    };
    (assembly, namespace, name)
}

/// A class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub fqn: String,
    pub assembly: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<InitializerSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl ClassSpec {
    /// Create a class from its FQN (`Assembly.Ns.Name`)
    pub fn new(fqn: impl Into<String>) -> Self {
        let fqn = fqn.into();
        let (assembly, namespace, name) = split_fqn(&fqn);
        Self {
            fqn,
            assembly,
            name,
            namespace,
            base: None,
            interfaces: vec![],
            is_abstract: false,
            initializer: None,
            methods: vec![],
            properties: vec![],
            docs: None,
        }
    }

    /// Set the base class
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add an implemented interface
    pub fn with_interface(mut self, iface: impl Into<String>) -> Self {
        self.interfaces.push(iface.into());
        self
    }

    /// Mark abstract
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the initializer
    pub fn with_initializer(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.initializer = Some(InitializerSpec {
            parameters,
            docs: None,
        });
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn with_property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    /// Set docs
    pub fn with_docs(mut self, docs: Docs) -> Self {
        self.docs = Some(docs);
        self
    }
}

/// An interface or struct declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub fqn: String,
    pub assembly: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub datatype: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl InterfaceSpec {
    /// Create a behavioral interface from its FQN
    pub fn new(fqn: impl Into<String>) -> Self {
        let fqn = fqn.into();
        let (assembly, namespace, name) = split_fqn(&fqn);
        Self {
            fqn,
            assembly,
            name,
            namespace,
            interfaces: vec![],
            datatype: false,
            methods: vec![],
            properties: vec![],
            docs: None,
        }
    }

    /// Create a data-only interface (struct) from its FQN
    pub fn new_struct(fqn: impl Into<String>) -> Self {
        let mut spec = Self::new(fqn);
        spec.datatype = true;
        spec
    }

    /// Add a base interface
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.interfaces.push(base.into());
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn with_property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    /// Set docs
    pub fn with_docs(mut self, docs: Docs) -> Self {
        self.docs = Some(docs);
        self
    }
}

/// An enum declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub fqn: String,
    pub assembly: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub members: Vec<EnumMemberSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl EnumSpec {
    /// Create an enum from its FQN and member names
    pub fn new(fqn: impl Into<String>, members: &[&str]) -> Self {
        let fqn = fqn.into();
        let (assembly, namespace, name) = split_fqn(&fqn);
        Self {
            fqn,
            assembly,
            name,
            namespace,
            members: members
                .iter()
                .map(|m| EnumMemberSpec {
                    name: m.to_string(),
                    docs: None,
                })
                .collect(),
            docs: None,
        }
    }
}

/// An enum member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

/// A class initializer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializerSpec {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

/// A method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<OptionalValue>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default, rename = "protected")]
    pub is_protected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl MethodSpec {
    /// Create a method without parameters or return value
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: vec![],
            returns: None,
            is_static: false,
            is_abstract: false,
            is_async: false,
            is_protected: false,
            docs: None,
        }
    }

    /// Add a parameter
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(OptionalValue { ty, optional: false });
        self
    }

    /// Mark static
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark abstract
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark async
    pub fn async_method(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Set docs
    pub fn with_docs(mut self, docs: Docs) -> Self {
        self.docs = Some(docs);
        self
    }
}

/// A property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub immutable: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default, rename = "protected")]
    pub is_protected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl PropertySpec {
    /// Create a mutable, required property
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            immutable: false,
            is_static: false,
            is_abstract: false,
            is_const: false,
            is_protected: false,
            docs: None,
        }
    }

    /// Mark optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark read-only
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Mark static
    pub fn static_property(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark abstract
    pub fn abstract_property(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as a constant: static and read-only
    pub fn const_property(mut self) -> Self {
        self.is_const = true;
        self.is_static = true;
        self.immutable = true;
        self
    }

    /// Set docs
    pub fn with_docs(mut self, docs: Docs) -> Self {
        self.docs = Some(docs);
        self
    }
}

/// A method or initializer parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
}

impl ParameterSpec {
    /// Create a required parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            variadic: false,
            docs: None,
        }
    }

    /// Mark optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark variadic
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::CastPrimitive;

    #[test]
    fn test_parse_minimal_assembly() {
        let json = r#"{
            "name": "acme",
            "version": "1.2.0",
            "targets": { "python": { "module": "acme", "distName": "acme-lib" } },
            "submodules": { "acme.widgets": {} },
            "types": {
                "acme.widgets.Gadget": {
                    "kind": "class",
                    "fqn": "acme.widgets.Gadget",
                    "assembly": "acme",
                    "name": "Gadget",
                    "namespace": "widgets",
                    "abstract": true,
                    "properties": [
                        { "name": "part", "type": { "fqn": "acme.widgets.Part" }, "optional": true }
                    ]
                },
                "acme.Color": {
                    "kind": "enum",
                    "fqn": "acme.Color",
                    "assembly": "acme",
                    "name": "Color",
                    "members": [{ "name": "RED" }]
                }
            }
        }"#;
        let assembly: Assembly = serde_json::from_str(json).unwrap();
        assert_eq!(assembly.python_module(), Some("acme"));
        assert_eq!(assembly.dist_name(), "acme-lib");
        assert_eq!(assembly.types.len(), 2);

        let gadget = &assembly.types["acme.widgets.Gadget"];
        match gadget {
            TypeSpec::Class(class) => {
                assert!(class.is_abstract);
                assert_eq!(class.namespace.as_deref(), Some("widgets"));
                assert!(class.properties[0].optional);
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_builders_split_fqn() {
        let class = ClassSpec::new("acme.widgets.Gadget");
        assert_eq!(class.assembly, "acme");
        assert_eq!(class.namespace.as_deref(), Some("widgets"));
        assert_eq!(class.name, "Gadget");

        let top = InterfaceSpec::new_struct("acme.Props");
        assert!(top.datatype);
        assert_eq!(top.namespace, None);
    }

    #[test]
    fn test_tarball_name() {
        let assembly = Assembly::new("@scope/jsii-calc", "3.20.120", "jsii_calc");
        assert_eq!(assembly.tarball_name(), "scope-jsii-calc@3.20.120.jsii.tgz");
    }

    #[test]
    fn test_property_builder() {
        let prop = PropertySpec::new("name", TypeRef::primitive(CastPrimitive::String))
            .optional()
            .immutable();
        assert!(prop.optional);
        assert!(prop.immutable);
        assert!(!prop.is_static);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.json");
        fs::write(&path, r#"{ "name": "acme", "version": "1.0.0" }"#).unwrap();

        let assembly = Assembly::load(&path).unwrap();
        assert_eq!(assembly.name, "acme");
        assert_eq!(assembly.python_module(), None);
        assert!(Assembly::load(dir.path().join("missing.json")).is_err());
        assert!(Assembly::from_json("{").is_err());
    }
}
