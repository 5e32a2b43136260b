//! Named-type resolution
//!
//! Decides how a reference to a declaration is spelled at a use site and
//! which import (if any) it needs. Three cases:
//!
//! - the target lives in another assembly: aliased whole-package import;
//! - the target lives in the module being written: no import, possibly a
//!   quoted forward reference;
//! - the target lives in another module of the same assembly: aliased
//!   relative import of its top-level name.

use crate::diagnostics::CastResult;
use crate::model::Model;
use crate::projection::NamingContext;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Spelling of a named reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub display: String,
    /// `(source, item)`; an empty item imports the source as a whole
    pub import: Option<(String, String)>,
}

/// First 8 hex digits of the sha256 of the concatenated parts
pub fn alias_suffix(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

/// Resolve a reference to `fqn` from the site described by `ctx`
pub fn resolve_named(fqn: &str, ctx: &NamingContext<'_>) -> CastResult<ResolvedName> {
    let model = ctx.model;
    let assembly = model.assembly();
    let target = model.python_fqn(fqn)?;

    let is_struct = model.type_spec(fqn)?.is_struct();
    let wrap = |display: String| {
        if ctx.type_annotation && ctx.parameter_type && is_struct {
            format!("typing.Union[{}, typing.Dict[builtins.str, typing.Any]]", display)
        } else {
            display
        }
    };

    if target.assembly_name != assembly.name {
        let alias = format!(
            "_{}_{}",
            target.package_name.replace('.', "_"),
            alias_suffix(&[&target.assembly_name, ".*"])
        );
        let display = format!("{}{}", alias, &target.python_fqn[target.package_name.len()..]);
        return Ok(ResolvedName {
            display: wrap(display),
            import: Some((format!("{} as {}", target.package_name, alias), String::new())),
        });
    }

    let module_py = model.python_fqn(ctx.submodule)?.python_fqn;
    let type_module_py = model.python_fqn(&find_parent_submodule(fqn, model))?.python_fqn;

    if type_module_py == module_py {
        let nesting_parent = ctx
            .surrounding
            .iter()
            .rev()
            .map(|s| model.python_fqn(s).map(|p| p.python_fqn))
            .collect::<CastResult<Vec<_>>>()?
            .into_iter()
            .find(|parent| target.python_fqn.starts_with(&format!("{}.", parent)));

        let relative = &target.python_fqn[module_py.len() + 1..];

        if ctx.type_annotation && (!ctx.emitted.contains(fqn) || nesting_parent.is_some()) {
            let quoted = serde_json::to_string(relative)?;
            return Ok(ResolvedName {
                display: wrap(quoted),
                import: None,
            });
        }

        if !ctx.type_annotation && nesting_parent.is_some() {
            return Ok(ResolvedName {
                display: target.python_fqn[target.package_name.len() + 1..].to_string(),
                import: None,
            });
        }

        return Ok(ResolvedName {
            display: wrap(relative.to_string()),
            import: None,
        });
    }

    let below = &target.python_fqn[type_module_py.len() + 1..];
    let mut segments = below.split('.');
    let to_import = segments.next().unwrap_or_default();
    let nested: Vec<&str> = segments.collect();

    let alias = format!(
        "_{}_{}",
        to_import,
        alias_suffix(&[&type_module_py, ".", to_import])
    );
    let display = std::iter::once(alias.as_str())
        .chain(nested)
        .collect::<Vec<_>>()
        .join(".");
    let source = relative_import_path(&module_py, &type_module_py);
    debug!(fqn = %fqn, from = %module_py, source = %source, "cross-module reference");

    Ok(ResolvedName {
        display: wrap(display),
        import: Some((source, format!("{} as {}", to_import, alias))),
    })
}

/// Relative import path from package `from` to package `to`
///
/// `('A.B.C.D', 'A.B.E')` gives `...E`, `('A.B.C', 'A.B')` gives `..`
/// and `('A.B', 'A.B.C')` gives `.C`.
pub fn relative_import_path(from: &str, to: &str) -> String {
    if to == from {
        return ".".to_string();
    }
    if from.is_empty() {
        return format!(".{}", to);
    }
    if let Some(rest) = to.strip_prefix(&format!("{}.", from)) {
        return format!(".{}", rest);
    }
    let parent = from.rfind('.').map(|i| &from[..i]).unwrap_or("");
    format!(".{}", relative_import_path(parent, to))
}

/// Absolute package a relative import in package `from` points at
///
/// Inverse of [`relative_import_path`]: `('A.B.C.D', '...E')` gives `A.B.E`.
/// Sources without a leading dot are returned unchanged.
pub fn absolute_import_path(from: &str, source: &str) -> String {
    let rest = source.trim_start_matches('.');
    let dots = source.len() - rest.len();
    if dots == 0 {
        return source.to_string();
    }
    let mut base: Vec<&str> = from.split('.').filter(|s| !s.is_empty()).collect();
    base.truncate(base.len().saturating_sub(dots - 1));
    if !rest.is_empty() {
        base.push(rest);
    }
    base.join(".")
}

/// The module owning a local type: its namespace, walked up through
/// enclosing types
pub fn find_parent_submodule(fqn: &str, model: &Model) -> String {
    let mut current = fqn;
    loop {
        let namespace = crate::model::Declaration::namespace_of(current);
        if namespace.is_empty() || !model.assembly().types.contains_key(namespace) {
            return if namespace.is_empty() {
                model.assembly().name.clone()
            } else {
                namespace.to_string()
            };
        }
        current = namespace;
    }
}
