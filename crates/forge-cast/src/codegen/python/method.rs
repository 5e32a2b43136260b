//! Methods and initializers

use super::docstring::{emit_docstring, DocArgument};
use super::typecheck::emit_parameter_type_checks;
use super::{EmitContext, EmitState, MemberOptions};
use crate::codegen::writer::{assign_call_result, open_signature, CodeWriter, SignatureKind};
use crate::diagnostics::CastResult;
use crate::ir::CastType;
use crate::model::{MethodDecl, MethodKind, Model};
use crate::projection::{python_type, required_imports, ImportSet, NamingContext};
use crate::symbol::naming::{python_parameter_name, slugify_as_needed};
use std::collections::BTreeSet;

/// Imports needed by the signature, lifted keyword arguments included
pub fn method_imports(method: &MethodDecl, ctx: &NamingContext<'_>) -> CastResult<ImportSet> {
    let mut imports = required_imports(&method.returns, ctx)?;
    for param in &method.parameters {
        imports.merge(required_imports(&param.ty, ctx)?);
    }
    if let Some(lifted) = &method.lifted_struct {
        let mut visited = BTreeSet::new();
        lifted_imports(lifted, ctx, &mut visited, &mut imports)?;
    }
    Ok(imports)
}

fn lifted_imports(
    fqn: &str,
    ctx: &NamingContext<'_>,
    visited: &mut BTreeSet<String>,
    imports: &mut ImportSet,
) -> CastResult<()> {
    if !visited.insert(fqn.to_string()) {
        return Ok(());
    }
    let spec = ctx.model.struct_spec(fqn)?;
    for prop in &spec.properties {
        imports.merge(required_imports(&CastType::from_ref(&prop.ty), ctx)?);
    }
    for base in &spec.interfaces {
        lifted_imports(base, ctx, visited, imports)?;
    }
    Ok(())
}

/// Names the lifted struct's own properties take as parameters
fn lifted_names(model: &Model, method: &MethodDecl) -> CastResult<Vec<String>> {
    let Some(lifted) = &method.lifted_struct else {
        return Ok(vec![]);
    };
    Ok(model
        .struct_spec(lifted)?
        .properties
        .iter()
        .map(|p| python_parameter_name(&p.name, &[]))
        .collect())
}

/// Write a method definition
pub fn emit_method(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    state: &mut EmitState,
    method: &MethodDecl,
    options: MemberOptions,
) -> CastResult<()> {
    let model = ctx.naming.model;
    let return_type = python_type(&method.returns, &ctx.naming)?;
    let lifted = lifted_names(model, method)?;
    let param_ctx = ctx.naming.with_parameter_type(true);

    let mut params = Vec::with_capacity(method.parameters.len() + 1);
    for param in &method.parameters {
        let default = if param.is_optional() { " = None" } else { "" };
        params.push(format!(
            "{}: {}{}",
            python_parameter_name(&param.name, &lifted),
            python_type(&param.ty, &param_ctx)?,
            default
        ));
    }

    let positional = if method.lifted_struct.is_some() {
        method.parameters.len().saturating_sub(1)
    } else {
        method.parameters.len()
    };
    let lifted_fields = match &method.lifted_struct {
        Some(fqn) => model.lifted_fields(fqn)?,
        None => vec![],
    };
    let mut arguments: Vec<DocArgument<'_>> = method.parameters[..positional]
        .iter()
        .map(|p| DocArgument {
            name: p.name.as_str(),
            docs: p.docs.as_ref(),
        })
        .collect();

    if method.lifted_struct.is_some() {
        params.pop();
        if !lifted_fields.is_empty() {
            params.push("*".to_string());
            for field in &lifted_fields {
                let default = if field.is_optional() { " = None" } else { "" };
                params.push(format!(
                    "{}: {}{}",
                    python_parameter_name(&field.js_name, &[]),
                    python_type(&field.ty, &param_ctx)?,
                    default
                ));
            }
        }
        arguments.extend(lifted_fields.iter().map(|f| DocArgument {
            name: f.js_name.as_str(),
            docs: f.docs.as_ref(),
        }));
    } else if let Some(last) = method.parameters.last().filter(|p| p.variadic) {
        params.pop();
        params.push(format!(
            "*{}: {}",
            python_parameter_name(&last.name, &[]),
            python_type(last.ty.required(), &ctx.naming)?
        ));
    }

    if let Some(js_name) = &method.js_name {
        code.line(format!("@jsii.member(jsii_name=\"{}\")", js_name));
    }
    if let Some(decorator) = method.kind.decorator() {
        code.line(format!("@{}", decorator));
    }
    if options.render_abstract && method.is_abstract {
        code.line("@abc.abstractmethod");
    }

    let in_use: Vec<String> = params
        .iter()
        .map(|p| p.split(':').next().unwrap_or_default().trim().to_string())
        .collect();
    let implicit = slugify_as_needed(method.kind.implicit_parameter(), &in_use);
    params.insert(0, implicit.clone());

    open_signature(code, SignatureKind::Def, &method.python_name, &params, Some(&return_type), None);
    emit_docstring(code, method.docs.as_ref(), Some(&arguments), false);

    let emits_body = method.kind.emits_body() || options.force_body;
    let concrete = !options.render_abstract || !method.is_abstract;
    if emits_body && concrete {
        emit_parameter_type_checks(
            code,
            ctx,
            &mut state.stubs,
            &params[1..],
            &format!("{}#{}", method.parent, method.python_name),
        );
    }

    if !emits_body || !concrete {
        code.line("...");
    } else {
        if let Some(struct_fqn) = &method.lifted_struct {
            emit_lifted_struct(code, ctx, method, struct_fqn, &lifted, &lifted_fields)?;
        }
        emit_runtime_call(code, method, &implicit, &lifted, &return_type);
    }
    code.close_block();
    Ok(())
}

/// Rebuild the struct argument from the keyword arguments
fn emit_lifted_struct(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    method: &MethodDecl,
    struct_fqn: &str,
    lifted: &[String],
    fields: &[crate::model::FieldDecl],
) -> CastResult<()> {
    let Some(last) = method.parameters.last() else {
        return Ok(());
    };
    let arg_name = python_parameter_name(&last.name, lifted);
    let type_name = python_type(
        &CastType::named(struct_fqn),
        &ctx.naming.with_type_annotation(false),
    )?;
    let assignments: Vec<String> = fields
        .iter()
        .map(|f| format!("{}={}", f.python_name, f.python_name))
        .collect();

    assign_call_result(code, &arg_name, &type_name, &assignments);
    code.blank();
    Ok(())
}

fn emit_runtime_call(
    code: &mut CodeWriter,
    method: &MethodDecl,
    implicit: &str,
    lifted: &[String],
    return_type: &str,
) {
    let mut call_args = Vec::with_capacity(3);
    if method.kind == MethodKind::Initializer {
        call_args.push(format!("{}.__class__", implicit));
    }
    call_args.push(implicit.to_string());
    if let Some(js_name) = &method.js_name {
        call_args.push(format!("\"{}\"", js_name));
    }

    let values: Vec<String> = method
        .parameters
        .iter()
        .map(|p| {
            let name = python_parameter_name(&p.name, lifted);
            if p.variadic {
                format!("*{}", name)
            } else {
                name
            }
        })
        .collect();

    let call = format!(
        "jsii.{}({}, [{}])",
        method.kind.runtime_call(),
        call_args.join(", "),
        values.join(", ")
    );
    if method.kind == MethodKind::Initializer {
        code.line(call);
    } else {
        code.line(format!("return typing.cast({}, {})", return_type, call));
    }
}
