//! Classes, interfaces and enums
//!
//! Each type is written in two phases. The definition is the class body
//! itself; once it is closed the type counts as emitted and later
//! annotations may reference it unquoted. The epilogue holds what has to
//! follow the definition: the proxy class of an interface or abstract
//! class, and the hook registering it.

use super::docstring::emit_docstring;
use super::method::{emit_method, method_imports};
use super::property::emit_property;
use super::structs::{emit_struct, struct_imports};
use super::{EmitContext, EmitState, MemberOptions};
use crate::codegen::writer::{emit_list, open_signature, CodeWriter, SignatureKind};
use crate::diagnostics::{CastError, CastResult};
use crate::ir::CastType;
use crate::model::{DeclKind, Declaration, Member};
use crate::projection::{python_type, required_imports, ImportSet, NamingContext};
use crate::sorter::prepare_members;
use tracing::debug;

/// Imports needed by a type declaration, nested types included
pub fn type_imports(decl: &Declaration, ctx: &NamingContext<'_>) -> CastResult<ImportSet> {
    match &decl.kind {
        DeclKind::Struct { .. } => struct_imports(decl, ctx),
        DeclKind::Enum => Ok(ImportSet::new()),
        DeclKind::Class { .. } | DeclKind::Interface { .. } => {
            let mut imports = ImportSet::new();
            for base in decl.bases() {
                imports.merge(required_imports(&CastType::named(base), ctx)?);
            }
            for member in &decl.members {
                imports.merge(member_imports(member, ctx)?);
            }
            Ok(imports)
        }
        DeclKind::Module { .. } => Err(CastError::invariant(format!(
            "Module {} is not a type",
            decl.fqn
        ))),
    }
}

/// Imports needed by one member of a module or type
pub fn member_imports(member: &Member, ctx: &NamingContext<'_>) -> CastResult<ImportSet> {
    match member {
        Member::Type(nested) => type_imports(ctx.model.declaration(&nested.fqn)?, ctx),
        Member::Method(method) => method_imports(method, ctx),
        Member::Property(property) => required_imports(&property.ty, ctx),
        Member::Field(field) => required_imports(&field.ty, ctx),
        Member::EnumMember(_) => Ok(ImportSet::new()),
    }
}

/// Write the definition of a type and record it as emitted
pub fn emit_definition(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    decl: &Declaration,
) -> CastResult<()> {
    debug!(fqn = %decl.fqn, "emitting type");
    match &decl.kind {
        DeclKind::Class { interfaces, is_abstract, .. } => {
            if !interfaces.is_empty() {
                let runtime_ctx = ctx.naming.with_type_annotation(false);
                let names = interfaces
                    .iter()
                    .map(|i| python_type(&CastType::named(i.as_str()), &runtime_ctx))
                    .collect::<CastResult<Vec<_>>>()?;
                code.line(format!("@jsii.implements({})", names.join(", ")));
            }
            let ctx = ctx.nested(&decl.fqn);
            let mut params = base_names(decl, &ctx)?;
            let metaclass = if *is_abstract { "JSIIAbstractClass" } else { "JSIIMeta" };
            params.push(format!("metaclass=jsii.{}", metaclass));
            params.push(format!("jsii_type=\"{}\"", decl.fqn));
            emit_class_body(code, &ctx, state, decl, &params, true)?;
        }
        DeclKind::Interface { .. } => {
            let ctx = ctx.nested(&decl.fqn);
            emit_list(code, "@jsii.interface(", &[format!("jsii_type=\"{}\"", decl.fqn)], ")", None);
            let mut params = base_names(decl, &ctx)?;
            params.push("typing_extensions.Protocol".to_string());
            emit_class_body(code, &ctx, state, decl, &params, true)?;
        }
        DeclKind::Enum => {
            let ctx = ctx.nested(&decl.fqn);
            emit_list(code, "@jsii.enum(", &[format!("jsii_type=\"{}\"", decl.fqn)], ")", None);
            emit_class_body(code, &ctx, state, decl, &["enum.Enum".to_string()], false)?;
        }
        DeclKind::Struct { .. } => emit_struct(code, ctx, state, decl)?,
        DeclKind::Module { .. } => {
            return Err(CastError::invariant(format!("Module {} is not a type", decl.fqn)))
        }
    }
    state.emitted.push(decl.fqn.clone());
    Ok(())
}

/// Write whatever has to follow the definition of a type
pub fn emit_epilogue(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    decl: &Declaration,
) -> CastResult<()> {
    match &decl.kind {
        DeclKind::Class {
            is_abstract: true,
            abstract_bases,
            ..
        } => {
            let ctx = ctx.nested(&decl.fqn);
            let runtime_ctx = ctx.naming.with_type_annotation(false);
            let mut bases = vec![decl.name.clone()];
            for base in abstract_bases {
                bases.push(format!(
                    "jsii.proxy_for({}) # type: ignore[misc]",
                    python_type(&CastType::named(base.as_str()), &runtime_ctx)?
                ));
            }

            let proxy = proxy_name(decl);
            code.blank();
            code.blank();
            open_signature(code, SignatureKind::Class, &proxy, &bases, None, None);
            let abstract_members: Vec<&Member> = decl
                .members
                .iter()
                .filter(|m| matches!(m, Member::Method(_) | Member::Property(_)) && m.is_abstract())
                .collect();
            if abstract_members.is_empty() {
                code.line("pass");
            }
            for (i, member) in abstract_members.into_iter().enumerate() {
                if i > 0 {
                    code.blank();
                }
                emit_member(code, &ctx, state, member, MemberOptions::concrete())?;
            }
            code.close_block();
            emit_proxy_hook(code, decl, "abstract class", &proxy);
        }
        DeclKind::Interface { bases } => {
            let ctx = ctx.nested(&decl.fqn);
            let runtime_ctx = ctx.naming.with_type_annotation(false);
            let proxy_bases = bases
                .iter()
                .map(|b| -> CastResult<String> {
                    Ok(format!(
                        "jsii.proxy_for({}) # type: ignore[misc]",
                        python_type(&CastType::named(b.as_str()), &runtime_ctx)?
                    ))
                })
                .collect::<CastResult<Vec<_>>>()?;

            let proxy = proxy_name(decl);
            code.blank();
            code.blank();
            open_signature(code, SignatureKind::Class, &proxy, &proxy_bases, None, None);
            emit_docstring(code, decl.docs.as_ref(), None, true);
            code.line(format!("__jsii_type__: typing.ClassVar[str] = \"{}\"", decl.fqn));
            let members: Vec<&Member> = decl
                .members
                .iter()
                .filter(|m| matches!(m, Member::Method(_) | Member::Property(_)))
                .collect();
            if members.is_empty() {
                code.line("pass");
            }
            for member in members {
                code.blank();
                emit_member(code, &ctx, state, member, MemberOptions::with_body())?;
            }
            code.close_block();
            emit_proxy_hook(code, decl, "interface", &proxy);
        }
        _ => {}
    }
    Ok(())
}

/// Write one member of a type body
pub fn emit_member(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    member: &Member,
    options: MemberOptions,
) -> CastResult<()> {
    match member {
        Member::Method(method) => emit_method(code, ctx, state, method, options),
        Member::Property(property) => emit_property(code, ctx, state, property, options),
        Member::EnumMember(value) => {
            code.line(format!("{} = \"{}\"", value.python_name, value.value));
            emit_docstring(code, value.docs.as_ref(), None, false);
            Ok(())
        }
        Member::Field(field) => {
            code.line(format!("{}: {}", field.python_name, python_type(&field.ty, &ctx.naming)?));
            emit_docstring(code, field.docs.as_ref(), None, false);
            Ok(())
        }
        Member::Type(nested) => {
            let decl = ctx.naming.model.declaration(&nested.fqn)?;
            emit_definition(code, ctx, state, decl)?;
            emit_epilogue(code, ctx, state, decl)
        }
    }
}

fn base_names(decl: &Declaration, ctx: &EmitContext<'_>) -> CastResult<Vec<String>> {
    let runtime_ctx = ctx.naming.with_type_annotation(false);
    let bases: Vec<&str> = match &decl.kind {
        DeclKind::Class { base, .. } => base.iter().map(String::as_str).collect(),
        _ => decl.bases(),
    };
    bases
        .into_iter()
        .map(|base| python_type(&CastType::named(base), &runtime_ctx))
        .collect()
}

fn emit_class_body(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    decl: &Declaration,
    params: &[String],
    separate_members: bool,
) -> CastResult<()> {
    open_signature(code, SignatureKind::Class, &decl.name, params, None, None);
    emit_docstring(code, decl.docs.as_ref(), None, true);

    if decl.members.is_empty() {
        code.line("pass");
    } else {
        let module_py = ctx.module_python_name()?;
        let members = prepare_members(&decl.members, ctx.naming.model, module_py)?;
        for (i, member) in members.into_iter().enumerate() {
            if separate_members && i > 0 {
                code.blank();
            }
            emit_member(code, ctx, state, member, MemberOptions::default())?;
        }
    }
    code.close_block();
    Ok(())
}

fn proxy_name(decl: &Declaration) -> String {
    format!("_{}Proxy", decl.name)
}

fn emit_proxy_hook(code: &mut CodeWriter, decl: &Declaration, what: &str, proxy: &str) {
    code.blank();
    code.line(format!(
        "# Adding a \"__jsii_proxy_class__(): typing.Type\" function to the {}",
        what
    ));
    code.line(format!(
        "typing.cast(typing.Any, {}).__jsii_proxy_class__ = lambda : {}",
        decl.name, proxy
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Docs, EnumSpec, MethodSpec};
    use crate::model::Model;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn render(model: &Model, fqn: &str, emitted: &[&str]) -> (String, EmitState) {
        let emitted: BTreeSet<String> = emitted.iter().map(|s| s.to_string()).collect();
        let ctx = EmitContext::new(NamingContext::new(model, &emitted, "Acme"), false);
        let mut state = EmitState::default();
        let mut code = CodeWriter::new();
        let decl = model.declaration(fqn).unwrap();
        emit_definition(&mut code, &ctx, &mut state, decl).unwrap();
        emit_epilogue(&mut code, &ctx, &mut state, decl).unwrap();
        (code.finish(), state)
    }

    #[test]
    fn test_enum() {
        let model = model(
            assembly("Acme", "acme").with_type(EnumSpec {
                docs: Some(Docs::summary("Colors.")),
                ..EnumSpec::new("Acme.Color", &["RED", "GREEN"])
            }),
        );
        let (out, state) = render(&model, "Acme.Color", &[]);
        assert_eq!(
            out,
            "@jsii.enum(jsii_type=\"Acme.Color\")\n\
             class Color(enum.Enum):\n\
             \x20   '''Colors.'''\n\
             \n\
             \x20   RED = \"RED\"\n\
             \x20   GREEN = \"GREEN\"\n"
        );
        assert_eq!(state.emitted, vec!["Acme.Color".to_string()]);
    }

    #[test]
    fn test_empty_class() {
        let model = model(assembly("Acme", "acme").with_type(class("Acme.Empty")));
        let (out, _) = render(&model, "Acme.Empty", &[]);
        assert_eq!(
            out,
            "class Empty(metaclass=jsii.JSIIMeta, jsii_type=\"Acme.Empty\"):\n    pass\n"
        );
    }

    #[test]
    fn test_class_with_base_and_interface() {
        let model = model(
            assembly("Acme", "acme")
                .with_type(interface("Acme.IShape"))
                .with_type(class("Acme.Base"))
                .with_type(
                    class("Acme.Square")
                        .with_base("Acme.Base")
                        .with_interface("Acme.IShape")
                        .with_property(prop("side", number()).immutable()),
                ),
        );
        let (out, _) = render(&model, "Acme.Square", &["Acme.IShape", "Acme.Base"]);
        assert!(out.starts_with(
            "@jsii.implements(IShape)\n\
             class Square(Base, metaclass=jsii.JSIIMeta, jsii_type=\"Acme.Square\"):\n\
             \x20   @builtins.property\n"
        ));
    }

    #[test]
    fn test_abstract_class_proxy() {
        let model = model(
            assembly("Acme", "acme").with_type(
                class("Acme.Shape")
                    .abstract_class()
                    .with_method(MethodSpec::new("area").returns(number()).abstract_method())
                    .with_method(MethodSpec::new("describe").returns(string())),
            ),
        );
        let (out, _) = render(&model, "Acme.Shape", &[]);
        assert!(out.starts_with("class Shape(metaclass=jsii.JSIIAbstractClass, jsii_type=\"Acme.Shape\"):\n"));
        assert!(out.contains("    @abc.abstractmethod\n    def area(self) -> jsii.Number:\n        ...\n"));
        assert!(out.contains("\n\n\nclass _ShapeProxy(Shape):\n    @jsii.member(jsii_name=\"area\")\n    def area(self) -> jsii.Number:\n        return typing.cast(jsii.Number, jsii.invoke(self, \"area\", []))\n"));
        assert!(!out.contains("class _ShapeProxy(Shape):\n    @jsii.member(jsii_name=\"describe\")"));
        assert!(out.ends_with(
            "\n# Adding a \"__jsii_proxy_class__(): typing.Type\" function to the abstract class\n\
             typing.cast(typing.Any, Shape).__jsii_proxy_class__ = lambda : _ShapeProxy\n"
        ));
    }

    #[test]
    fn test_interface_and_proxy() {
        let model = model(
            assembly("Acme", "acme")
                .with_type(interface("Acme.IBase"))
                .with_type(
                    interface("Acme.IShape")
                        .with_base("Acme.IBase")
                        .with_property(prop("area", number()).immutable())
                        .with_docs(Docs::summary("A shape.")),
                ),
        );
        let (out, _) = render(&model, "Acme.IShape", &["Acme.IBase"]);
        assert_eq!(
            out,
            r#"@jsii.interface(jsii_type="Acme.IShape")
class IShape(IBase, typing_extensions.Protocol):
    '''A shape.'''

    @builtins.property
    @jsii.member(jsii_name="area")
    def area(self) -> jsii.Number:
        ...


class _IShapeProxy(
    jsii.proxy_for(IBase), # type: ignore[misc]
):
    '''A shape.'''

    __jsii_type__: typing.ClassVar[str] = "Acme.IShape"

    @builtins.property
    @jsii.member(jsii_name="area")
    def area(self) -> jsii.Number:
        return typing.cast(jsii.Number, jsii.get(self, "area"))

# Adding a "__jsii_proxy_class__(): typing.Type" function to the interface
typing.cast(typing.Any, IShape).__jsii_proxy_class__ = lambda : _IShapeProxy
"#
        );
    }

    #[test]
    fn test_nested_types_follow_members() {
        let model = model(
            assembly("Acme", "acme")
                .with_type(class("Acme.Outer").with_property(prop("size", number()).immutable()))
                .with_type(EnumSpec::new("Acme.Outer.Mode", &["FAST"])),
        );
        let (out, state) = render(&model, "Acme.Outer", &[]);
        let property = out.find("def size").unwrap();
        let nested = out.find("    class Mode(enum.Enum):").unwrap();
        assert!(property < nested);
        assert_eq!(state.emitted, vec!["Acme.Outer.Mode".to_string(), "Acme.Outer".to_string()]);
    }

    #[test]
    fn test_type_imports_of_module_type_is_an_error() {
        let model = model(assembly("Acme", "acme"));
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(&model, &emitted, "Acme");
        let err = type_imports(model.declaration("Acme").unwrap(), &ctx).unwrap_err();
        assert!(matches!(err, CastError::Invariant(_)));
    }
}
