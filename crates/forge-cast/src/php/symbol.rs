//! PHP symbols
//!
//! IR FQNs are normalized to PHP namespaces: `acme.foo-bar.Gadget` becomes
//! `Acme\FooBar\Gadget`. Class members hang off their owner with `::`
//! (`Acme\Gadget::spin`), parameters off their method with `::$`
//! (`Acme\Gadget::spin::$speed`).

use crate::diagnostics::CastResult;
use crate::ir::{Assembly, ClassSpec, InterfaceSpec, MethodSpec, PropertySpec, TypeSpec};
use crate::symbol::{Symbol, SymbolKind, SymbolTable};
use serde::Serialize;
use tracing::{debug, info};

/// Separator between namespace segments
pub const NAMESPACE_SEPARATOR: &str = "\\";

/// Separator between a class and its members
pub const MEMBER_SEPARATOR: &str = "::";

/// Normalize a dotted IR FQN to a PHP namespaced name
pub fn normalize_fqn(fqn: &str) -> String {
    fqn.split('.')
        .map(|part| part.split('-').map(capitalize).collect::<String>())
        .collect::<Vec<_>>()
        .join(NAMESPACE_SEPARATOR)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    fn from_protected(protected: bool) -> Self {
        if protected {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Symbol variants, mirroring the IR
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "camelCase")]
pub enum PhpKind {
    Class {
        /// Normalized FQN of the parent class
        extends: Option<String>,
        implements: Vec<String>,
        is_abstract: bool,
    },
    Interface {
        extends: Vec<String>,
    },
    Enum {
        members: Vec<String>,
    },
    Method {
        visibility: Visibility,
        is_static: bool,
        is_abstract: bool,
    },
    Property {
        visibility: Visibility,
        is_static: bool,
        immutable: bool,
        is_const: bool,
    },
    Parameter {
        variadic: bool,
        optional: bool,
    },
}

/// A declaration in the PHP symbol table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhpSymbol {
    pub fqn: String,
    pub name: String,
    /// Namespace of the declaration (FQN without its last segment)
    pub namespace: String,
    pub kind: PhpKind,
}

impl PhpSymbol {
    fn declaration(fqn: String, kind: PhpKind) -> Self {
        let (namespace, name) = match fqn.rfind(NAMESPACE_SEPARATOR) {
            Some(i) => (fqn[..i].to_string(), fqn[i + NAMESPACE_SEPARATOR.len()..].to_string()),
            None => (String::new(), fqn.clone()),
        };
        Self {
            fqn,
            name,
            namespace,
            kind,
        }
    }

    fn member(owner: &str, name: &str, kind: PhpKind) -> Self {
        let namespace = owner
            .rfind(NAMESPACE_SEPARATOR)
            .map_or("", |i| &owner[..i])
            .to_string();
        Self {
            fqn: format!("{}{}{}", owner, MEMBER_SEPARATOR, name),
            name: name.to_string(),
            namespace,
            kind,
        }
    }
}

impl Symbol for PhpSymbol {
    fn fqn(&self) -> &str {
        &self.fqn
    }

    fn kind(&self) -> SymbolKind {
        match self.kind {
            PhpKind::Class { .. } => SymbolKind::Class,
            PhpKind::Interface { .. } => SymbolKind::Interface,
            PhpKind::Enum { .. } => SymbolKind::Enum,
            PhpKind::Method { .. } => SymbolKind::Method,
            PhpKind::Property { is_const: true, .. } => SymbolKind::Constant,
            PhpKind::Property { .. } => SymbolKind::Property,
            PhpKind::Parameter { .. } => SymbolKind::Parameter,
        }
    }
}

/// The PHP symbol table of one assembly
#[derive(Debug, Clone, Default)]
pub struct PhpSymbols {
    table: SymbolTable<PhpSymbol>,
}

impl PhpSymbols {
    /// Register every type, method, property and parameter of `assembly`
    pub fn build(assembly: &Assembly) -> CastResult<Self> {
        let mut symbols = Self::default();
        for spec in assembly.types.values() {
            match spec {
                TypeSpec::Class(class) => symbols.register_class(class)?,
                TypeSpec::Interface(iface) => symbols.register_interface(iface)?,
                TypeSpec::Enum(enm) => {
                    let kind = PhpKind::Enum {
                        members: enm.members.iter().map(|m| m.name.clone()).collect(),
                    };
                    symbols.register(PhpSymbol::declaration(normalize_fqn(&enm.fqn), kind))?;
                }
            }
        }
        info!(assembly = %assembly.name, symbols = symbols.table.len(), "php symbols built");
        Ok(symbols)
    }

    fn register(&mut self, symbol: PhpSymbol) -> CastResult<()> {
        debug!(fqn = %symbol.fqn, "php symbol");
        self.table.register(symbol)
    }

    fn register_class(&mut self, class: &ClassSpec) -> CastResult<()> {
        let fqn = normalize_fqn(&class.fqn);
        self.register(PhpSymbol::declaration(
            fqn.clone(),
            PhpKind::Class {
                extends: class.base.as_deref().map(normalize_fqn),
                implements: class.interfaces.iter().map(|i| normalize_fqn(i)).collect(),
                is_abstract: class.is_abstract,
            },
        ))?;

        if let Some(init) = &class.initializer {
            let constructor = MethodSpec {
                parameters: init.parameters.clone(),
                ..MethodSpec::new("__construct")
            };
            self.register_method(&fqn, &constructor)?;
        }
        for method in &class.methods {
            self.register_method(&fqn, method)?;
        }
        for prop in &class.properties {
            self.register_property(&fqn, prop)?;
        }
        Ok(())
    }

    fn register_interface(&mut self, iface: &InterfaceSpec) -> CastResult<()> {
        let fqn = normalize_fqn(&iface.fqn);
        self.register(PhpSymbol::declaration(
            fqn.clone(),
            PhpKind::Interface {
                extends: iface.interfaces.iter().map(|i| normalize_fqn(i)).collect(),
            },
        ))?;
        for method in &iface.methods {
            self.register_method(&fqn, method)?;
        }
        for prop in &iface.properties {
            self.register_property(&fqn, prop)?;
        }
        Ok(())
    }

    fn register_method(&mut self, owner: &str, method: &MethodSpec) -> CastResult<()> {
        let symbol = PhpSymbol::member(
            owner,
            &method.name,
            PhpKind::Method {
                visibility: Visibility::from_protected(method.is_protected),
                is_static: method.is_static,
                is_abstract: method.is_abstract,
            },
        );
        let method_fqn = symbol.fqn.clone();
        self.register(symbol)?;

        for param in &method.parameters {
            self.register(PhpSymbol::member(
                &method_fqn,
                &format!("${}", param.name),
                PhpKind::Parameter {
                    variadic: param.variadic,
                    optional: param.optional,
                },
            ))?;
        }
        Ok(())
    }

    fn register_property(&mut self, owner: &str, prop: &PropertySpec) -> CastResult<()> {
        self.register(PhpSymbol::member(
            owner,
            &prop.name,
            PhpKind::Property {
                visibility: Visibility::from_protected(prop.is_protected),
                is_static: prop.is_static,
                immutable: prop.immutable,
                is_const: prop.is_const,
            },
        ))
    }

    /// The underlying table
    pub fn table(&self) -> &SymbolTable<PhpSymbol> {
        &self.table
    }

    /// Look up by normalized FQN
    pub fn lookup(&self, fqn: &str) -> Option<&PhpSymbol> {
        self.table.lookup(fqn)
    }

    /// Look up by IR FQN
    pub fn lookup_ir(&self, ir_fqn: &str) -> Option<&PhpSymbol> {
        self.table.lookup(&normalize_fqn(ir_fqn))
    }

    /// Parent class of a class, when it is declared in this assembly
    pub fn parent_class(&self, class: &PhpSymbol) -> Option<&PhpSymbol> {
        match &class.kind {
            PhpKind::Class {
                extends: Some(parent),
                ..
            } => self.table.lookup_of_kind(parent, SymbolKind::Class),
            _ => None,
        }
    }

    /// Interfaces extended by an interface or implemented by a class
    ///
    /// Interfaces of other assemblies are not in the table and are skipped;
    /// a local name registered as something else is an invariant violation.
    pub fn interfaces(&self, symbol: &PhpSymbol) -> CastResult<Vec<&PhpSymbol>> {
        let names = match &symbol.kind {
            PhpKind::Class { implements, .. } => implements,
            PhpKind::Interface { extends } => extends,
            _ => return Ok(vec![]),
        };
        names
            .iter()
            .filter(|name| self.table.contains(name))
            .map(|name| self.table.require(name, SymbolKind::Interface))
            .collect()
    }

    /// Members (methods, properties, constants) of a class or interface
    pub fn members<'s>(&'s self, owner: &'s PhpSymbol) -> impl Iterator<Item = &'s PhpSymbol> + 's {
        let prefix = format!("{}{}", owner.fqn, MEMBER_SEPARATOR);
        self.table.iter().filter(move |s| {
            s.fqn
                .strip_prefix(&prefix)
                .map_or(false, |rest| !rest.contains(MEMBER_SEPARATOR))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CastError;
    use crate::ir::EnumSpec;
    use crate::test_support::*;

    #[test]
    fn test_normalize_fqn() {
        assert_eq!(normalize_fqn("acme.foo-bar.Gadget"), "Acme\\FooBar\\Gadget");
        assert_eq!(normalize_fqn("acme"), "Acme");
        assert_eq!(normalize_fqn("acme.a--b"), "Acme\\AB");
    }

    fn gadgets() -> Assembly {
        assembly("acme", "acme")
            .with_type(interface("acme.IShape").with_method(MethodSpec::new("area")))
            .with_type(class("acme.Base").abstract_class())
            .with_type(
                class("acme.widgets.Gadget")
                    .with_base("acme.Base")
                    .with_interface("acme.IShape")
                    .with_initializer(vec![param("size", number())])
                    .with_method(MethodSpec::new("spin").param(param("parts", string()).variadic()))
                    .with_property(prop("label", string()).immutable()),
            )
            .with_type(EnumSpec::new("acme.Color", &["RED"]))
    }

    #[test]
    fn test_registers_types_and_members() {
        let symbols = PhpSymbols::build(&gadgets()).unwrap();

        let gadget = symbols.lookup_ir("acme.widgets.Gadget").unwrap();
        assert_eq!(gadget.name, "Gadget");
        assert_eq!(gadget.namespace, "Acme\\Widgets");

        let spin = symbols.lookup("Acme\\Widgets\\Gadget::spin").unwrap();
        assert_eq!(spin.kind(), SymbolKind::Method);
        assert_eq!(spin.namespace, "Acme\\Widgets");

        let parts = symbols.lookup("Acme\\Widgets\\Gadget::spin::$parts").unwrap();
        assert_eq!(
            parts.kind,
            PhpKind::Parameter {
                variadic: true,
                optional: false
            }
        );
        assert!(symbols.lookup("Acme\\Widgets\\Gadget::__construct::$size").is_some());

        let members: Vec<&str> = symbols.members(gadget).map(|s| s.name.as_str()).collect();
        assert_eq!(members, vec!["__construct", "spin", "label"]);
        assert_eq!(symbols.lookup_ir("acme.Color").unwrap().kind(), SymbolKind::Enum);
    }

    #[test]
    fn test_parent_class_and_interfaces() {
        let symbols = PhpSymbols::build(&gadgets()).unwrap();
        let gadget = symbols.lookup_ir("acme.widgets.Gadget").unwrap();

        assert_eq!(symbols.parent_class(gadget).unwrap().fqn, "Acme\\Base");
        let base = symbols.lookup_ir("acme.Base").unwrap();
        assert!(symbols.parent_class(base).is_none());

        let interfaces = symbols.interfaces(gadget).unwrap();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].fqn, "Acme\\IShape");
    }

    #[test]
    fn test_foreign_parent_is_not_resolved() {
        let symbols = PhpSymbols::build(
            &assembly("acme", "acme").with_type(class("acme.Gadget").with_base("base.Resource")),
        )
        .unwrap();
        let gadget = symbols.lookup_ir("acme.Gadget").unwrap();
        assert!(symbols.parent_class(gadget).is_none());
    }

    #[test]
    fn test_normalization_collision() {
        let assembly = assembly("acme", "acme")
            .with_type(class("acme.foo-bar.Gadget"))
            .with_type(class("acme.fooBar.Gadget"));
        match PhpSymbols::build(&assembly) {
            Err(CastError::SymbolCollision { fqn }) => assert_eq!(fqn, "Acme\\FooBar\\Gadget"),
            other => panic!("unexpected result: {:?}", other.map(|s| s.table().len())),
        }
    }
}
