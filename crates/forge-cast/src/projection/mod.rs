//! Type projection
//!
//! Turns a [`CastType`] into the text of a Python type expression plus the
//! imports that make it resolvable, for one use site. The use site is
//! described by a [`NamingContext`]: which module is being written, which
//! types are already emitted, which type declarations enclose the site and
//! whether the text ends up in an annotation or in a runtime expression.
//!
//! Projection is pure: the same type and context always produce the same
//! display and the same imports.

mod imports;

pub use imports::ImportSet;

use crate::diagnostics::CastResult;
use crate::ir::{CastPrimitive, CastType, CollectionKind};
use crate::model::Model;
use crate::resolver::named::resolve_named;
use std::collections::BTreeSet;

/// Description of a use site
#[derive(Debug, Clone)]
pub struct NamingContext<'a> {
    pub model: &'a Model,
    /// Types whose definition has already been written to the module
    pub emitted: &'a BTreeSet<String>,
    /// IR FQN of the module being written
    pub submodule: &'a str,
    /// FQNs of the type declarations enclosing the site, outermost first
    pub surrounding: Vec<String>,
    /// Annotation site (`true`) or runtime expression (`false`)
    pub type_annotation: bool,
    /// The site annotates a parameter
    pub parameter_type: bool,
    /// An enclosing optional wrapper was already rendered
    pub ignore_optional: bool,
}

impl<'a> NamingContext<'a> {
    /// Context for an annotation at module level
    pub fn new(model: &'a Model, emitted: &'a BTreeSet<String>, submodule: &'a str) -> Self {
        Self {
            model,
            emitted,
            submodule,
            surrounding: Vec::new(),
            type_annotation: true,
            parameter_type: false,
            ignore_optional: false,
        }
    }

    /// Context inside the declaration of `fqn`
    pub fn nested(&self, fqn: &str) -> Self {
        let mut ctx = self.clone();
        ctx.surrounding.push(fqn.to_string());
        ctx
    }

    pub fn with_type_annotation(&self, type_annotation: bool) -> Self {
        Self {
            type_annotation,
            ..self.clone()
        }
    }

    pub fn with_parameter_type(&self, parameter_type: bool) -> Self {
        Self {
            parameter_type,
            ..self.clone()
        }
    }

    fn ignoring_optional(&self) -> Self {
        Self {
            ignore_optional: true,
            ..self.clone()
        }
    }
}

/// Result of projecting one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub display: String,
    pub imports: ImportSet,
}

/// Project a type for a use site
pub fn project(ty: &CastType, ctx: &NamingContext<'_>) -> CastResult<Projection> {
    let projection = match ty {
        CastType::Void => literal("None"),
        CastType::Primitive(primitive) => literal(primitive_literal(*primitive)),
        CastType::Collection { kind, element } => {
            let inner = project(element, ctx)?;
            let display = match kind {
                CollectionKind::Array if ctx.parameter_type => format!("typing.Sequence[{}]", inner.display),
                CollectionKind::Array => format!("typing.List[{}]", inner.display),
                CollectionKind::Map => format!("typing.Mapping[builtins.str, {}]", inner.display),
            };
            Projection {
                display,
                imports: inner.imports,
            }
        }
        CastType::Union(options) => {
            let projected = options
                .iter()
                .map(|option| project(option, ctx))
                .collect::<CastResult<Vec<_>>>()?;
            let displays: Vec<&str> = projected.iter().map(|p| p.display.as_str()).collect();
            Projection {
                display: format!("typing.Union[{}]", displays.join(", ")),
                imports: ImportSet::merged(projected.iter().map(|p| p.imports.clone())),
            }
        }
        CastType::Optional(inner) => {
            let wrapped = project(inner, &ctx.ignoring_optional())?;
            if ctx.ignore_optional || inner.is_any() {
                wrapped
            } else {
                Projection {
                    display: format!("typing.Optional[{}]", wrapped.display),
                    imports: wrapped.imports,
                }
            }
        }
        CastType::Named(fqn) => {
            let resolved = resolve_named(fqn, ctx)?;
            let mut imports = ImportSet::new();
            if let Some((source, item)) = resolved.import {
                imports.add(source, item);
            }
            Projection {
                display: resolved.display,
                imports,
            }
        }
    };
    Ok(projection)
}

/// Display text only
pub fn python_type(ty: &CastType, ctx: &NamingContext<'_>) -> CastResult<String> {
    project(ty, ctx).map(|p| p.display)
}

/// Imports only
pub fn required_imports(ty: &CastType, ctx: &NamingContext<'_>) -> CastResult<ImportSet> {
    project(ty, ctx).map(|p| p.imports)
}

fn literal(display: &str) -> Projection {
    Projection {
        display: display.to_string(),
        imports: ImportSet::new(),
    }
}

fn primitive_literal(primitive: CastPrimitive) -> &'static str {
    match primitive {
        CastPrimitive::Boolean => "builtins.bool",
        CastPrimitive::Date => "datetime.datetime",
        CastPrimitive::Number => "jsii.Number",
        CastPrimitive::String => "builtins.str",
        CastPrimitive::Json => "typing.Mapping[typing.Any, typing.Any]",
        CastPrimitive::Any => "typing.Any",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;

    fn string_t() -> CastType {
        CastType::Primitive(CastPrimitive::String)
    }

    #[test]
    fn test_primitives_and_collections() {
        let model = model(assembly("Acme", "acme"));
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(&model, &emitted, "Acme");

        assert_eq!(python_type(&CastType::Void, &ctx).unwrap(), "None");
        assert_eq!(
            python_type(&CastType::array(string_t()), &ctx).unwrap(),
            "typing.List[builtins.str]"
        );
        assert_eq!(
            python_type(&CastType::array(string_t()), &ctx.with_parameter_type(true)).unwrap(),
            "typing.Sequence[builtins.str]"
        );
        assert_eq!(
            python_type(&CastType::map(CastType::Primitive(CastPrimitive::Json)), &ctx).unwrap(),
            "typing.Mapping[builtins.str, typing.Mapping[typing.Any, typing.Any]]"
        );
    }

    #[test]
    fn test_optional_rendering() {
        let model = model(assembly("Acme", "acme"));
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(&model, &emitted, "Acme");

        let opt = CastType::optional(CastType::array(CastType::optional(string_t())));
        assert_eq!(
            python_type(&opt, &ctx).unwrap(),
            "typing.Optional[typing.List[builtins.str]]"
        );
        let opt_any = CastType::from_value(&any(), true);
        assert_eq!(opt_any, CastType::optional(CastType::Primitive(CastPrimitive::Any)));
        assert_eq!(python_type(&opt_any, &ctx).unwrap(), "typing.Any");
    }

    #[test]
    fn test_union_merges_imports() {
        let dep = assembly("Base", "base_lib").with_type(class("Base.Thing"));
        let local = assembly("Acme", "acme")
            .with_dependency("Base", "^1.0.0", "base_lib")
            .with_submodule("Acme.core", None)
            .with_type(class("Acme.core.Engine"));
        let model = Model::build(local, vec![dep]).unwrap();
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(&model, &emitted, "Acme");

        let ty = CastType::Union(vec![
            CastType::named("Base.Thing"),
            CastType::named("Acme.core.Engine"),
        ]);
        let projection = project(&ty, &ctx).unwrap();
        assert!(projection.display.starts_with("typing.Union[_base_lib_"));
        assert_eq!(projection.imports.len(), 2);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let model = model(
            assembly("Acme", "acme")
                .with_submodule("Acme.core", None)
                .with_type(class("Acme.core.Engine")),
        );
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(&model, &emitted, "Acme");
        let ty = CastType::named("Acme.core.Engine");
        assert_eq!(project(&ty, &ctx).unwrap(), project(&ty, &ctx).unwrap());
    }
}
