//! Structs
//!
//! A struct is a plain data class over a `_values` dict, registered with
//! the runtime through `@jsii.data_type`. Inherited fields are repeated on
//! every struct so the constructor accepts all of them as keywords.

use super::docstring::{emit_docstring, DocArgument};
use super::typecheck::emit_parameter_type_checks;
use super::{EmitContext, EmitState};
use crate::codegen::writer::{assign_dictionary, emit_list, open_signature, CodeWriter, SignatureKind};
use crate::diagnostics::CastResult;
use crate::ir::CastType;
use crate::model::{Declaration, FieldDecl};
use crate::projection::{python_type, required_imports, ImportSet, NamingContext};
use crate::symbol::naming::slugify_as_needed;

/// Imports needed by the bases and every field, inherited ones included
pub fn struct_imports(decl: &Declaration, ctx: &NamingContext<'_>) -> CastResult<ImportSet> {
    let mut imports = ImportSet::new();
    for base in decl.bases() {
        imports.merge(required_imports(&CastType::named(base), ctx)?);
    }
    for field in ctx.model.struct_fields(&decl.fqn)? {
        imports.merge(required_imports(&field.ty, ctx)?);
    }
    Ok(imports)
}

/// Write a struct definition
pub fn emit_struct(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    decl: &Declaration,
) -> CastResult<()> {
    let ctx = ctx.nested(&decl.fqn);
    let runtime_ctx = ctx.naming.with_type_annotation(false);
    let fields = ctx.naming.model.struct_fields(&decl.fqn)?;

    let bases = decl
        .bases()
        .into_iter()
        .map(|base| python_type(&CastType::named(base), &runtime_ctx))
        .collect::<CastResult<Vec<_>>>()?;
    let name_mapping = fields
        .iter()
        .map(|f| -> CastResult<String> {
            Ok(format!(
                "{}: {}",
                serde_json::to_string(&f.python_name)?,
                serde_json::to_string(&f.js_name)?
            ))
        })
        .collect::<CastResult<Vec<_>>>()?;

    code.indent("@jsii.data_type(");
    code.line(format!("jsii_type={},", serde_json::to_string(&decl.fqn)?));
    emit_list(code, "jsii_struct_bases=[", &bases, "],", None);
    assign_dictionary(code, "name_mapping", &name_mapping, ",", true);
    code.unindent(")");
    open_signature(code, SignatureKind::Class, &decl.name, &bases, None, None);

    emit_constructor(code, &ctx, state, decl, &fields)?;

    for field in &fields {
        code.blank();
        emit_getter(code, &ctx, field)?;
    }

    emit_magic_methods(code, &decl.name);
    code.close_block();
    Ok(())
}

fn emit_constructor(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    decl: &Declaration,
    fields: &[FieldDecl],
) -> CastResult<()> {
    let param_ctx = ctx.naming.with_parameter_type(true);
    let kwargs = fields
        .iter()
        .map(|f| -> CastResult<String> {
            let default = if f.is_optional() { " = None" } else { "" };
            Ok(format!("{}: {}{}", f.python_name, python_type(&f.ty, &param_ctx)?, default))
        })
        .collect::<CastResult<Vec<_>>>()?;

    let names: Vec<String> = fields.iter().map(|f| f.python_name.clone()).collect();
    let implicit = slugify_as_needed("self", &names);
    let mut params = vec![implicit.clone()];
    if !kwargs.is_empty() {
        params.push("*".to_string());
        params.extend(kwargs.iter().cloned());
    }

    open_signature(code, SignatureKind::Def, "__init__", &params, Some("None"), None);
    let arguments: Vec<DocArgument<'_>> = fields
        .iter()
        .map(|f| DocArgument {
            name: f.python_name.as_str(),
            docs: f.docs.as_ref(),
        })
        .collect();
    emit_docstring(code, decl.docs.as_ref(), Some(&arguments), false);

    let runtime_ctx = ctx.naming.with_type_annotation(false);
    for field in fields {
        let Some(fqn) = field.ty.named_fqn() else {
            continue;
        };
        if !ctx.naming.model.is_struct(fqn) {
            continue;
        }
        let type_name = python_type(field.ty.required(), &runtime_ctx)?;
        code.open_block(format!("if isinstance({}, dict)", field.python_name));
        code.line(format!("{} = {}(**{})", field.python_name, type_name, field.python_name));
        code.close_block();
    }

    if !kwargs.is_empty() {
        let checked = std::iter::once("*".to_string()).chain(kwargs).collect::<Vec<_>>();
        emit_parameter_type_checks(
            code,
            &ctx.with_kwargs_checks(),
            &mut state.stubs,
            &checked,
            &format!("{}#__init__", decl.fqn),
        );
    }

    let required = fields
        .iter()
        .filter(|f| !f.is_optional())
        .map(|f| -> CastResult<String> {
            Ok(format!("{}: {}", serde_json::to_string(&f.python_name)?, f.python_name))
        })
        .collect::<CastResult<Vec<_>>>()?;
    assign_dictionary(
        code,
        &format!("{}._values: typing.Dict[builtins.str, typing.Any]", implicit),
        &required,
        "",
        false,
    );

    for field in fields.iter().filter(|f| f.is_optional()) {
        code.open_block(format!("if {} is not None", field.python_name));
        code.line(format!("{}._values[\"{}\"] = {}", implicit, field.python_name, field.python_name));
        code.close_block();
    }

    code.close_block();
    Ok(())
}

fn emit_getter(code: &mut CodeWriter, ctx: &EmitContext<'_>, field: &FieldDecl) -> CastResult<()> {
    let python_type = python_type(&field.ty, &ctx.naming)?;
    code.line("@builtins.property");
    open_signature(
        code,
        SignatureKind::Def,
        &field.python_name,
        &["self".to_string()],
        Some(&python_type),
        None,
    );
    emit_docstring(code, field.docs.as_ref(), None, false);
    code.line(format!(
        "result = self._values.get({})",
        serde_json::to_string(&field.python_name)?
    ));
    if !field.is_optional() {
        code.line(format!(
            "assert result is not None, \"Required property '{}' is missing\"",
            field.python_name
        ));
    }
    code.line(format!("return typing.cast({}, result)", python_type));
    code.close_block();
    Ok(())
}

fn emit_magic_methods(code: &mut CodeWriter, name: &str) {
    code.blank();
    code.open_block("def __eq__(self, rhs: typing.Any) -> builtins.bool");
    code.line("return isinstance(rhs, self.__class__) and rhs._values == self._values");
    code.close_block();

    code.blank();
    code.open_block("def __ne__(self, rhs: typing.Any) -> builtins.bool");
    code.line("return not (rhs == self)");
    code.close_block();

    code.blank();
    code.open_block("def __repr__(self) -> str");
    code.indent(format!("return \"{}(%s)\" % \", \".join(", name));
    code.line("k + \"=\" + repr(v) for k, v in self._values.items()");
    code.unindent(")");
    code.close_block();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::test_support::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn shapes() -> Model {
        model(
            assembly("Acme", "acme")
                .with_type(struct_type("Acme.Point").with_property(prop("x", number())))
                .with_type(
                    struct_type("Acme.Box")
                        .with_property(prop("origin", named("Acme.Point")))
                        .with_property(prop("label", string()).optional()),
                ),
        )
    }

    fn render(model: &Model, fqn: &str, checks: bool) -> (String, EmitState) {
        let mut emitted = BTreeSet::new();
        emitted.insert("Acme.Point".to_string());
        let ctx = EmitContext::new(NamingContext::new(model, &emitted, "Acme"), checks);
        let mut state = EmitState::default();
        let mut code = CodeWriter::new();
        emit_struct(&mut code, &ctx, &mut state, model.declaration(fqn).unwrap()).unwrap();
        (code.finish(), state)
    }

    #[test]
    fn test_simple_struct() {
        let model = shapes();
        let (out, _) = render(&model, "Acme.Point", false);
        assert_eq!(
            out,
            r#"@jsii.data_type(
    jsii_type="Acme.Point",
    jsii_struct_bases=[],
    name_mapping={"x": "x"},
)
class Point:
    def __init__(self, *, x: jsii.Number) -> None:
        '''
        :param x: -
        '''
        self._values: typing.Dict[builtins.str, typing.Any] = {
            "x": x,
        }

    @builtins.property
    def x(self) -> jsii.Number:
        result = self._values.get("x")
        assert result is not None, "Required property 'x' is missing"
        return typing.cast(jsii.Number, result)

    def __eq__(self, rhs: typing.Any) -> builtins.bool:
        return isinstance(rhs, self.__class__) and rhs._values == self._values

    def __ne__(self, rhs: typing.Any) -> builtins.bool:
        return not (rhs == self)

    def __repr__(self) -> str:
        return "Point(%s)" % ", ".join(
            k + "=" + repr(v) for k, v in self._values.items()
        )
"#
        );
    }

    #[test]
    fn test_struct_field_coercion_and_optional_values() {
        let model = shapes();
        let (out, state) = render(&model, "Acme.Box", true);
        assert!(out.contains("        if isinstance(origin, dict):\n            origin = Point(**origin)\n"));
        assert!(out.contains("check_type(argname=\"argument origin\""));
        assert!(out.contains("check_type(argname=\"argument label\""));
        assert!(out.contains("        if label is not None:\n            self._values[\"label\"] = label\n"));
        assert!(!state.stubs.is_empty());
    }

    #[test]
    fn test_inherited_fields_and_bases() {
        let model = model(
            assembly("Acme", "acme")
                .with_type(struct_type("Acme.Base").with_property(prop("id", string())))
                .with_type(struct_type("Acme.Child").with_base("Acme.Base").with_property(prop("extra", boolean()))),
        );
        let mut emitted = BTreeSet::new();
        emitted.insert("Acme.Base".to_string());
        let ctx = EmitContext::new(NamingContext::new(&model, &emitted, "Acme"), false);
        let mut state = EmitState::default();
        let mut code = CodeWriter::new();
        emit_struct(&mut code, &ctx, &mut state, model.declaration("Acme.Child").unwrap()).unwrap();
        let out = code.finish();

        assert!(out.contains("    jsii_struct_bases=[Base],\n"));
        assert!(out.contains("    name_mapping={\"id\": \"id\", \"extra\": \"extra\"},\n"));
        assert!(out.contains("class Child(Base):\n"));
        assert!(out.contains("def __init__(self, *, id: builtins.str, extra: builtins.bool) -> None:"));

        let imports = struct_imports(model.declaration("Acme.Child").unwrap(), &ctx.naming).unwrap();
        assert!(imports.is_empty());
    }
}
