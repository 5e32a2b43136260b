//! Runtime type checks
//!
//! Checked bodies resolve their annotations through a module-level stub
//! function with the same signature, so forward references in the
//! annotations are evaluated once the whole module is defined.

use super::EmitContext;
use crate::codegen::writer::{open_signature, CodeWriter, SignatureKind};
use crate::symbol::naming::slugify_as_needed;
use sha2::{Digest, Sha256};

const STUB_PREFIX: &str = "_typecheckingstub__";

/// A stub function appended at the end of the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckStub {
    name: String,
    params: Vec<String>,
}

impl TypeCheckStub {
    pub fn new(fqn: &str, params: &[String]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(STUB_PREFIX.as_bytes());
        hasher.update(fqn.as_bytes());
        Self {
            name: format!("{}{:x}", STUB_PREFIX, hasher.finalize()),
            params: params.iter().map(|p| p.replace('"', "")).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emit(&self, code: &mut CodeWriter) {
        code.blank();
        open_signature(code, SignatureKind::Def, &self.name, &self.params, Some("None"), None);
        code.line("\"\"\"Type checking stubs\"\"\"");
        code.line("pass");
        code.close_block();
    }
}

/// Stubs referenced by the module being written
#[derive(Debug, Default)]
pub struct StubRegistry {
    stubs: Vec<TypeCheckStub>,
}

impl StubRegistry {
    /// Register a stub and return the expression reading its annotations
    pub fn type_hints(&mut self, fqn: &str, params: &[String]) -> String {
        let stub = TypeCheckStub::new(fqn, params);
        let expression = format!("typing.get_type_hints({})", stub.name());
        self.stubs.push(stub);
        expression
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Write every registered stub and forget them
    pub fn flush(&mut self, code: &mut CodeWriter) {
        for stub in self.stubs.drain(..) {
            stub.emit(code);
        }
    }
}

enum CheckedParam<'p> {
    KwargsMark,
    Plain(&'p str),
    Rest(&'p str),
}

fn checked_param(param: &str) -> CheckedParam<'_> {
    let end = param.find(&[':', '=', '#'][..]).unwrap_or(param.len());
    let name = param[..end].trim();
    if name == "*" {
        CheckedParam::KwargsMark
    } else if let Some(rest) = name.strip_prefix('*') {
        CheckedParam::Rest(rest)
    } else {
        CheckedParam::Plain(name)
    }
}

/// Write `check_type` calls for `params` (signature text without the
/// implicit parameter). Returns whether anything was written.
pub fn emit_parameter_type_checks(
    code: &mut CodeWriter,
    ctx: &EmitContext<'_>,
    stubs: &mut StubRegistry,
    params: &[String],
    fqn: &str,
) -> bool {
    if !ctx.runtime_type_checking {
        return false;
    }

    let infos: Vec<CheckedParam<'_>> = params.iter().map(|p| checked_param(p)).collect();
    let names: Vec<String> = infos
        .iter()
        .filter_map(|info| match info {
            CheckedParam::Plain(name) | CheckedParam::Rest(name) => Some(name.to_string()),
            CheckedParam::KwargsMark => None,
        })
        .collect();
    let types_var = slugify_as_needed("type_hints", &names);

    let mut opened = false;
    for info in &infos {
        let (name, rest) = match info {
            CheckedParam::KwargsMark if ctx.check_kwargs => continue,
            CheckedParam::KwargsMark => break,
            CheckedParam::Plain(name) => (*name, false),
            CheckedParam::Rest(name) => (*name, true),
        };

        if !opened {
            code.open_block("if __debug__");
            code.line(format!("{} = {}", types_var, stubs.type_hints(fqn, params)));
            opened = true;
        }

        let mut expected = format!("{}[\"{}\"]", types_var, name);
        let mut comment = "";
        if rest {
            expected = format!("typing.Tuple[{}, ...]", expected);
            comment = " # pyright: ignore [reportGeneralTypeIssues]";
        }
        code.line(format!(
            "check_type(argname=\"argument {}\", value={}, expected_type={}){}",
            name, name, expected, comment
        ));
    }

    if opened {
        code.close_block();
    }
    opened
}
