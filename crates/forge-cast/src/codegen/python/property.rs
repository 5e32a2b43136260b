//! Properties
//!
//! A getter, plus a setter for mutable properties. Both delegate to the
//! runtime's `get`/`set` (`sget`/`sset` for static properties).

use super::docstring::emit_docstring;
use super::typecheck::emit_parameter_type_checks;
use super::{EmitContext, EmitState, MemberOptions};
use crate::codegen::writer::{open_signature, CodeWriter, SignatureKind};
use crate::diagnostics::CastResult;
use crate::model::{PropertyDecl, PropertyKind};
use crate::projection::python_type;

pub fn emit_property(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    property: &PropertyDecl,
    options: MemberOptions,
) -> CastResult<()> {
    let python_type = python_type(&property.ty, &ctx.naming)?;
    let implicit = property.kind.implicit_parameter();
    let (getter, setter) = property.kind.runtime_accessors();
    let is_static = property.kind == PropertyKind::Static;
    let emits_body = property.kind != PropertyKind::Interface || options.force_body;
    let concrete = !options.render_abstract || !property.is_abstract;

    code.line(format!("@{}", property.kind.decorator()));
    code.line(format!("@jsii.member(jsii_name=\"{}\")", property.js_name));
    if options.render_abstract && property.is_abstract {
        code.line("@abc.abstractmethod");
    }
    let comment = (is_static && !property.immutable).then_some("pyright: ignore [reportGeneralTypeIssues]");
    open_signature(
        code,
        SignatureKind::Def,
        &property.python_name,
        &[implicit.to_string()],
        Some(&python_type),
        comment,
    );
    emit_docstring(code, property.docs.as_ref(), None, false);
    if emits_body && concrete {
        code.line(format!(
            "return typing.cast({}, jsii.{}({}, \"{}\"))",
            python_type, getter, implicit, property.js_name
        ));
    } else {
        code.line("...");
    }
    code.close_block();

    if property.immutable {
        return Ok(());
    }

    code.blank();
    let marker = if is_static { " # type: ignore[no-redef]" } else { "" };
    code.line(format!("@{}.setter{}", property.python_name, marker));
    if options.render_abstract && property.is_abstract {
        code.line("@abc.abstractmethod");
    }
    let value = format!("value: {}", python_type);
    open_signature(
        code,
        SignatureKind::Def,
        &property.python_name,
        &[implicit.to_string(), value.clone()],
        Some("None"),
        None,
    );
    if emits_body && concrete {
        emit_parameter_type_checks(
            code,
            ctx,
            &mut state.stubs,
            &[value],
            &format!("{}#{}", property.parent, property.python_name),
        );
        code.line(format!(
            "jsii.{}({}, \"{}\", value)",
            setter, implicit, property.js_name
        ));
    } else {
        code.line("...");
    }
    code.close_block();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Docs;
    use crate::model::{Member, Model};
    use crate::projection::NamingContext;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn render(model: &Model, owner: &str, name: &str, options: MemberOptions, checks: bool) -> String {
        let emitted = BTreeSet::new();
        let ctx = EmitContext::new(NamingContext::new(model, &emitted, "Acme").nested(owner), checks);
        let mut state = EmitState::default();
        let mut code = CodeWriter::new();
        let property = model
            .declaration(owner)
            .unwrap()
            .members
            .iter()
            .find_map(|m| match m {
                Member::Property(p) if p.python_name == name => Some(p),
                _ => None,
            })
            .unwrap();
        emit_property(&mut code, &ctx, &mut state, property, options).unwrap();
        code.finish()
    }

    fn gadget() -> Model {
        model(
            assembly("Acme", "acme")
                .with_type(
                    class("Acme.Gadget")
                        .with_property(prop("size", number()).immutable().with_docs(Docs::summary("The size.")))
                        .with_property(prop("label", string()).optional())
                        .with_property(prop("counter", number()).static_property()),
                )
                .with_type(interface("Acme.IShape").with_property(prop("area", number()).immutable())),
        )
    }

    #[test]
    fn test_readonly_property() {
        let model = gadget();
        assert_eq!(
            render(&model, "Acme.Gadget", "size", MemberOptions::default(), false),
            "@builtins.property\n\
             @jsii.member(jsii_name=\"size\")\n\
             def size(self) -> jsii.Number:\n\
             \x20   '''The size.'''\n\
             \x20   return typing.cast(jsii.Number, jsii.get(self, \"size\"))\n"
        );
    }

    #[test]
    fn test_mutable_property_has_checked_setter() {
        let model = gadget();
        let out = render(&model, "Acme.Gadget", "label", MemberOptions::default(), true);
        assert!(out.contains("\n@label.setter\ndef label(self, value: typing.Optional[builtins.str]) -> None:\n"));
        assert!(out.contains("    if __debug__:\n"));
        assert!(out.ends_with("    jsii.set(self, \"label\", value)\n"));
    }

    #[test]
    fn test_static_property_markers() {
        let model = gadget();
        let out = render(&model, "Acme.Gadget", "counter", MemberOptions::default(), false);
        assert!(out.starts_with("@jsii.python.classproperty\n"));
        assert!(out.contains("def counter(cls) -> jsii.Number:  # pyright: ignore [reportGeneralTypeIssues]\n"));
        assert!(out.contains("@counter.setter # type: ignore[no-redef]\n"));
        assert!(out.contains("jsii.sset(cls, \"counter\", value)"));
    }

    #[test]
    fn test_interface_property_body_only_when_forced() {
        let model = gadget();
        let plain = render(&model, "Acme.IShape", "area", MemberOptions::default(), false);
        assert!(plain.ends_with("    ...\n"));
        let forced = render(&model, "Acme.IShape", "area", MemberOptions::with_body(), false);
        assert!(forced.ends_with("    return typing.cast(jsii.Number, jsii.get(self, \"area\"))\n"));
    }
}
