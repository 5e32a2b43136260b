//! Declaration model
//!
//! A closed tagged-variant hierarchy: every declaration shares the same
//! header (`fqn`, `name`, `namespace`, `docs`) and carries a [`DeclKind`]
//! discriminant the emitter switches on. Relations to other declarations
//! (bases, implemented interfaces, nested types) are stored as FQN strings
//! and resolved through the symbol table at use time.

use crate::ir::{CastType, Docs};
use crate::symbol::{Symbol, SymbolKind};
use serde::Serialize;

/// A module, class, interface, struct or enum
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    /// IR fully-qualified name
    pub fqn: String,
    /// Target name: the python package for modules, the identifier otherwise
    pub name: String,
    /// FQN of the enclosing declaration (empty for the assembly root)
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<Docs>,
    pub kind: DeclKind,
    #[serde(skip)]
    pub members: Vec<Member>,
}

/// Declaration variants
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum DeclKind {
    Module {
        #[serde(skip_serializing_if = "Option::is_none")]
        readme: Option<String>,
    },
    Class {
        #[serde(skip_serializing_if = "Option::is_none")]
        base: Option<String>,
        interfaces: Vec<String>,
        is_abstract: bool,
        /// Bases that are abstract classes (proxied by the abstract proxy)
        abstract_bases: Vec<String>,
    },
    Interface {
        bases: Vec<String>,
    },
    Struct {
        bases: Vec<String>,
    },
    Enum,
}

impl Declaration {
    /// Namespace computed by stripping the last FQN segment
    pub fn namespace_of(fqn: &str) -> &str {
        fqn.rfind('.').map(|i| &fqn[..i]).unwrap_or("")
    }

    /// Whether this is a module
    pub fn is_module(&self) -> bool {
        matches!(self.kind, DeclKind::Module { .. })
    }

    /// Whether this is a data-only interface
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, DeclKind::Struct { .. })
    }

    /// Whether docs flag this declaration as deprecated
    pub fn is_deprecated(&self) -> bool {
        self.docs.as_ref().map_or(false, Docs::is_deprecated)
    }

    /// Structural bases, in declaration order (base class first)
    pub fn bases(&self) -> Vec<&str> {
        match &self.kind {
            DeclKind::Class {
                base, interfaces, ..
            } => base
                .iter()
                .chain(interfaces.iter())
                .map(String::as_str)
                .collect(),
            DeclKind::Interface { bases } | DeclKind::Struct { bases } => {
                bases.iter().map(String::as_str).collect()
            }
            DeclKind::Module { .. } | DeclKind::Enum => vec![],
        }
    }
}

impl Symbol for Declaration {
    fn fqn(&self) -> &str {
        &self.fqn
    }

    fn kind(&self) -> SymbolKind {
        match self.kind {
            DeclKind::Module { .. } => SymbolKind::Module,
            DeclKind::Class { .. } => SymbolKind::Class,
            DeclKind::Interface { .. } => SymbolKind::Interface,
            DeclKind::Struct { .. } => SymbolKind::Struct,
            DeclKind::Enum => SymbolKind::Enum,
        }
    }
}

/// A member of a module or type
#[derive(Debug, Clone)]
pub enum Member {
    /// A type declared inside this container, resolved by FQN
    Type(TypeMember),
    Method(MethodDecl),
    Property(PropertyDecl),
    /// A struct field declared directly on the struct
    Field(FieldDecl),
    EnumMember(EnumMemberDecl),
}

impl Member {
    /// Name in the generated code
    pub fn python_name(&self) -> &str {
        match self {
            Member::Type(t) => &t.python_name,
            Member::Method(m) => &m.python_name,
            Member::Property(p) => &p.python_name,
            Member::Field(f) => &f.python_name,
            Member::EnumMember(e) => &e.python_name,
        }
    }

    /// Docs of the member
    pub fn docs(&self) -> Option<&Docs> {
        match self {
            Member::Type(t) => t.docs.as_ref(),
            Member::Method(m) => m.docs.as_ref(),
            Member::Property(p) => p.docs.as_ref(),
            Member::Field(f) => f.docs.as_ref(),
            Member::EnumMember(e) => e.docs.as_ref(),
        }
    }

    /// Whether the member carries a deprecation notice
    pub fn is_deprecated(&self) -> bool {
        self.docs().map_or(false, Docs::is_deprecated)
    }

    /// FQN of a nested type, the only members with structural dependencies
    pub fn sortable_fqn(&self) -> Option<&str> {
        match self {
            Member::Type(t) => Some(&t.fqn),
            _ => None,
        }
    }

    /// Whether the member is abstract
    pub fn is_abstract(&self) -> bool {
        match self {
            Member::Method(m) => m.is_abstract,
            Member::Property(p) => p.is_abstract,
            _ => false,
        }
    }
}

/// Reference to a nested type declaration
#[derive(Debug, Clone)]
pub struct TypeMember {
    pub fqn: String,
    pub python_name: String,
    pub docs: Option<Docs>,
}

/// How a method reaches the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    /// `__init__`, calls `jsii.create`
    Initializer,
    /// Instance method, calls `jsii.invoke`
    Instance,
    /// Class method, calls `jsii.sinvoke`
    Static,
    /// Async instance method, calls `jsii.ainvoke`
    Async,
    /// Interface method, body-less unless emitted in a proxy
    Interface,
}

impl MethodKind {
    /// Name of the runtime call
    pub fn runtime_call(&self) -> &'static str {
        match self {
            MethodKind::Initializer => "create",
            MethodKind::Instance | MethodKind::Interface => "invoke",
            MethodKind::Static => "sinvoke",
            MethodKind::Async => "ainvoke",
        }
    }

    /// Name of the implicit first parameter
    pub fn implicit_parameter(&self) -> &'static str {
        match self {
            MethodKind::Static => "cls",
            _ => "self",
        }
    }

    /// Extra decorator, if any
    pub fn decorator(&self) -> Option<&'static str> {
        match self {
            MethodKind::Static => Some("builtins.classmethod"),
            _ => None,
        }
    }

    /// Whether a body is emitted outside of proxies
    pub fn emits_body(&self) -> bool {
        !matches!(self, MethodKind::Interface)
    }
}

/// A method or initializer
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub python_name: String,
    /// IR name, `None` for initializers
    pub js_name: Option<String>,
    pub kind: MethodKind,
    pub parameters: Vec<ParamDecl>,
    pub returns: CastType,
    pub is_abstract: bool,
    /// Struct whose fields are lifted into keyword arguments
    pub lifted_struct: Option<String>,
    /// FQN of the declaring type
    pub parent: String,
    pub docs: Option<Docs>,
}

/// A method parameter
#[derive(Debug, Clone)]
pub struct ParamDecl {
    /// IR name
    pub name: String,
    /// Type with optionality folded in
    pub ty: CastType,
    pub variadic: bool,
    pub docs: Option<Docs>,
}

impl ParamDecl {
    /// Whether the parameter may be omitted
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }
}

/// How a property reaches the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Instance,
    Static,
    Interface,
}

impl PropertyKind {
    /// Getter decorator
    pub fn decorator(&self) -> &'static str {
        match self {
            PropertyKind::Static => "jsii.python.classproperty",
            _ => "builtins.property",
        }
    }

    /// Name of the implicit first parameter
    pub fn implicit_parameter(&self) -> &'static str {
        match self {
            PropertyKind::Static => "cls",
            _ => "self",
        }
    }

    /// Runtime getter and setter names
    pub fn runtime_accessors(&self) -> (&'static str, &'static str) {
        match self {
            PropertyKind::Static => ("sget", "sset"),
            _ => ("get", "set"),
        }
    }
}

/// A property of a class or behavioral interface
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub python_name: String,
    pub js_name: String,
    pub ty: CastType,
    pub kind: PropertyKind,
    pub immutable: bool,
    pub is_abstract: bool,
    pub parent: String,
    pub docs: Option<Docs>,
}

/// A struct field
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub python_name: String,
    pub js_name: String,
    pub ty: CastType,
    /// FQN of the struct that declares the field
    pub defining_type: String,
    pub docs: Option<Docs>,
}

impl FieldDecl {
    /// Whether the field may be omitted
    pub fn is_optional(&self) -> bool {
        self.ty.is_optional()
    }
}

/// An enum member
#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub python_name: String,
    pub value: String,
    pub docs: Option<Docs>,
}
