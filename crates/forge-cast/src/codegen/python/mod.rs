//! Python module generator
//!
//! Renders every module of a [`Model`] to the source of its `__init__.py`,
//! plus the `_jsii` module that loads the assembly into the runtime.

mod class;
mod docstring;
mod method;
mod property;
mod structs;
mod typecheck;

pub use class::{member_imports, type_imports};
pub use typecheck::{StubRegistry, TypeCheckStub};

use crate::codegen::writer::{emit_list, CodeWriter};
use crate::diagnostics::{CastError, CastResult};
use crate::model::{DeclKind, Declaration, Model};
use crate::projection::{ImportSet, NamingContext};
use crate::resolver::package;
use crate::sorter::prepare_members;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

const PREAMBLE: &[&str] = &[
    "import abc",
    "import builtins",
    "import datetime",
    "import enum",
    "import typing",
    "",
    "import jsii",
    "import publication",
    "import typing_extensions",
    "",
    "from typeguard import check_type",
];

const LOAD_COMMENT: &str =
    "# Loading modules to ensure their types are registered with the jsii runtime library";

/// Naming context plus the switches that shape emitted bodies
#[derive(Debug, Clone)]
pub struct EmitContext<'a> {
    pub naming: NamingContext<'a>,
    /// Emit `check_type` calls into bodies
    pub runtime_type_checking: bool,
    /// Also check keyword-only parameters (struct constructors)
    pub check_kwargs: bool,
}

impl<'a> EmitContext<'a> {
    pub fn new(naming: NamingContext<'a>, runtime_type_checking: bool) -> Self {
        Self {
            naming,
            runtime_type_checking,
            check_kwargs: false,
        }
    }

    /// Context inside the declaration of `fqn`
    pub fn nested(&self, fqn: &str) -> Self {
        Self {
            naming: self.naming.nested(fqn),
            ..self.clone()
        }
    }

    pub fn with_kwargs_checks(&self) -> Self {
        Self {
            check_kwargs: true,
            ..self.clone()
        }
    }

    /// Python name of the module being written
    pub fn module_python_name(&self) -> CastResult<&'a str> {
        let model: &'a Model = self.naming.model;
        Ok(model.declaration(self.naming.submodule)?.name.as_str())
    }
}

/// Mutable state collected while writing one module
#[derive(Debug, Default)]
pub struct EmitState {
    /// Types written since the caller last drained this list
    pub emitted: Vec<String>,
    pub stubs: StubRegistry,
}

/// How a member body is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberOptions {
    /// Mark abstract members `@abc.abstractmethod` with a `...` body
    pub render_abstract: bool,
    /// Give interface members a body (proxy classes)
    pub force_body: bool,
}

impl Default for MemberOptions {
    fn default() -> Self {
        Self {
            render_abstract: true,
            force_body: false,
        }
    }
}

impl MemberOptions {
    /// Abstract members rendered as concrete delegating members
    pub fn concrete() -> Self {
        Self {
            render_abstract: false,
            force_body: false,
        }
    }

    /// Every member gets a delegating body
    pub fn with_body() -> Self {
        Self {
            render_abstract: true,
            force_body: true,
        }
    }
}

/// One rendered python module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    /// Dotted python module name
    pub python_name: String,
    /// IR FQN of the module, `None` for the assembly loader
    pub fqn: Option<String>,
    pub source: String,
}

impl GeneratedModule {
    /// Path of the module source, relative to the package root
    pub fn file_path(&self) -> PathBuf {
        let mut path = PathBuf::from("src");
        for segment in self.python_name.split('.') {
            path.push(segment);
        }
        path.push("__init__.py");
        path
    }
}

/// Generator for the python modules of one assembly
pub struct PythonGenerator<'a> {
    model: &'a Model,
    runtime_type_checking: bool,
}

impl<'a> PythonGenerator<'a> {
    /// Create a generator with runtime type checks enabled
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            runtime_type_checking: true,
        }
    }

    pub fn with_runtime_type_checking(mut self, enabled: bool) -> Self {
        self.runtime_type_checking = enabled;
        self
    }

    /// Render the loader module and every module of the assembly
    pub fn generate(&self) -> CastResult<Vec<GeneratedModule>> {
        let mut modules = vec![GeneratedModule {
            python_name: self.model.loader_module()?,
            fqn: None,
            source: self.render_loader()?,
        }];

        for module in self.model.modules() {
            modules.push(GeneratedModule {
                python_name: module.name.clone(),
                fqn: Some(module.fqn.clone()),
                source: self.render_module(module)?,
            });
        }

        info!(
            assembly = %self.model.assembly().name,
            modules = modules.len(),
            "python modules rendered"
        );
        Ok(modules)
    }

    /// Render the `<root>._jsii` module
    pub fn render_loader(&self) -> CastResult<String> {
        let assembly = self.model.assembly();
        let mut code = CodeWriter::new();
        for line in PREAMBLE {
            code.line(line);
        }

        let mut deps = assembly
            .dependencies
            .keys()
            .map(|dep| {
                package::root_module(dep, assembly).map_err(|_| {
                    CastError::config(format!(
                        "No Python target was configured for the dependency \"{}\".",
                        dep
                    ))
                })
            })
            .map(|module| module.map(|m| format!("{}._jsii", m)))
            .collect::<CastResult<Vec<_>>>()?;
        deps.sort();
        if !deps.is_empty() {
            code.blank();
            for dep in deps {
                code.line(format!("import {}", dep));
            }
        }

        code.blank();
        emit_list(
            &mut code,
            "__jsii_assembly__ = jsii.JSIIAssembly.load(",
            &[
                serde_json::to_string(&assembly.name)?,
                serde_json::to_string(&assembly.version)?,
                "__name__[0:-6]".to_string(),
                serde_json::to_string(&assembly.tarball_name())?,
            ],
            ")",
            None,
        );

        code.blank();
        emit_exports(&mut code, &["\"__jsii_assembly__\"".to_string()]);
        Ok(code.finish())
    }

    /// Imports required by every type of a module
    pub fn module_imports(&self, module: &Declaration) -> CastResult<ImportSet> {
        let emitted = BTreeSet::new();
        let ctx = NamingContext::new(self.model, &emitted, &module.fqn);
        let mut imports = ImportSet::new();
        for member in &module.members {
            imports.merge(member_imports(member, &ctx)?);
        }
        Ok(imports)
    }

    /// Render the `__init__.py` of a module
    pub fn render_module(&self, module: &Declaration) -> CastResult<String> {
        let DeclKind::Module { readme } = &module.kind else {
            return Err(CastError::invariant(format!("{} is not a module", module.fqn)));
        };
        debug!(module = %module.name, "rendering module");

        let mut code = CodeWriter::new();
        if let Some(readme) = readme.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            code.line("'''");
            for line in readme.lines() {
                code.line(line);
            }
            code.line("'''");
        }
        for line in PREAMBLE {
            code.line(line);
        }

        code.blank();
        code.line(format!("from {}_jsii import *", ".".repeat(self.module_depth(module) + 1)));
        emit_import_statements(&mut code, &self.module_imports(module)?);

        let members = prepare_members(&module.members, self.model, &module.name)?;
        let mut emitted = BTreeSet::new();
        let mut state = EmitState::default();
        for member in &members {
            let Some(fqn) = member.sortable_fqn() else {
                continue;
            };
            let decl = self.model.declaration(fqn)?;
            code.blank();
            code.blank();
            {
                let ctx = self.context(&emitted, &module.fqn);
                class::emit_definition(&mut code, &ctx, &mut state, decl)?;
            }
            emitted.extend(state.emitted.drain(..));
            {
                let ctx = self.context(&emitted, &module.fqn);
                class::emit_epilogue(&mut code, &ctx, &mut state, decl)?;
            }
            emitted.extend(state.emitted.drain(..));
        }

        let children = self.child_modules(module);
        let mut exports: Vec<String> = members
            .iter()
            .map(|m| format!("\"{}\"", m.python_name()))
            .collect();
        exports.extend(children.iter().map(|(_, last)| format!("\"{}\"", last)));

        if !members.is_empty() {
            code.blank();
        }
        code.blank();
        emit_exports(&mut code, &exports);

        if !children.is_empty() {
            code.blank();
            code.line(LOAD_COMMENT);
            for (relative, _) in &children {
                code.line(format!("from . import {}", relative));
            }
        }

        state.stubs.flush(&mut code);
        Ok(code.finish())
    }

    fn context<'e>(&self, emitted: &'e BTreeSet<String>, submodule: &'e str) -> EmitContext<'e>
    where
        'a: 'e,
    {
        EmitContext::new(
            NamingContext::new(self.model, emitted, submodule),
            self.runtime_type_checking,
        )
    }

    /// Number of IR segments between the assembly root and `module`
    fn module_depth(&self, module: &Declaration) -> usize {
        let root = &self.model.assembly().name;
        module
            .fqn
            .strip_prefix(root.as_str())
            .map_or(0, |rest| rest.matches('.').count())
    }

    /// Direct child modules as (name relative to `module`, last component),
    /// sorted by python name
    fn child_modules(&self, module: &Declaration) -> Vec<(String, String)> {
        let mut children: Vec<&Declaration> = self.model.child_modules(module).collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
            .into_iter()
            .map(|child| {
                let last = child.name.rsplit('.').next().unwrap_or_default().to_string();
                let relative = child
                    .name
                    .strip_prefix(&format!("{}.", module.name))
                    .map_or_else(|| last.clone(), str::to_string);
                (relative, last)
            })
            .collect()
    }
}

/// `__all__` followed by `publication.publish()`
fn emit_exports(code: &mut CodeWriter, exports: &[String]) {
    let mut exports = exports.to_vec();
    exports.sort();
    exports.dedup();
    if exports.is_empty() {
        code.line("__all__: typing.List[typing.Any] = []");
    } else {
        code.indent("__all__ = [");
        for export in &exports {
            code.line(format!("{},", export));
        }
        code.unindent("]");
    }
    code.blank();
    code.line("publication.publish()");
}

enum ImportStatement<'s> {
    Whole(&'s str),
    Items(&'s str, Vec<String>),
}

impl ImportStatement<'_> {
    fn comparison_base(&self) -> String {
        match self {
            ImportStatement::Whole(source) => format!("import {}", source),
            ImportStatement::Items(source, _) => format!("from {} import", source),
        }
    }

    fn is_whole(&self) -> bool {
        matches!(self, ImportStatement::Whole(_))
    }
}

/// `import X as Y` statements, then `from X import (...)` statements
fn emit_import_statements(code: &mut CodeWriter, imports: &ImportSet) {
    let mut statements = Vec::new();
    for (source, items) in imports.iter() {
        if items.contains("") {
            statements.push(ImportStatement::Whole(source));
        }
        let piecemeal: Vec<String> = items.iter().filter(|i| !i.is_empty()).cloned().collect();
        if !piecemeal.is_empty() {
            statements.push(ImportStatement::Items(source, piecemeal));
        }
    }
    statements.sort_by(|left, right| match (left.is_whole(), right.is_whole()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => left.comparison_base().cmp(&right.comparison_base()),
    });

    if !statements.is_empty() {
        code.blank();
    }
    for statement in &statements {
        match statement {
            ImportStatement::Whole(source) => code.line(format!("import {}", source)),
            ImportStatement::Items(source, items) => emit_list(
                code,
                &format!("from {} import ", source),
                items,
                "",
                Some(("(", ")")),
            ),
        }
    }
}
