//! Member ordering
//!
//! Members that cannot reference each other at class-body level (methods,
//! properties, fields, enum members) keep their encounter order and come
//! first. Nested types follow, each one only after every sibling it
//! inherits from.

use crate::diagnostics::{CastError, CastResult};
use crate::model::{Member, Model};
use crate::resolver::deps::depends_on;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Apply the name-collision policy, then order the survivors
pub fn prepare_members<'m>(
    members: &'m [Member],
    model: &Model,
    module_py: &str,
) -> CastResult<Vec<&'m Member>> {
    let mut by_name: IndexMap<&str, Vec<&'m Member>> = IndexMap::new();
    for member in members {
        by_name.entry(member.python_name()).or_default().push(member);
    }

    let mut survivors = Vec::with_capacity(by_name.len());
    for (name, candidates) in by_name {
        if candidates.len() == 1 {
            survivors.extend(candidates);
            continue;
        }

        let live: Vec<&Member> = candidates.into_iter().filter(|m| !m.is_deprecated()).collect();
        match live.len() {
            0 => return Err(CastError::AllDeprecated { name: name.to_string() }),
            1 => survivors.extend(live),
            _ => return Err(CastError::AmbiguousName { name: name.to_string() }),
        }
    }

    sort_members(survivors, model, module_py)
}

/// Order members so that every nested type follows its same-scope bases
pub fn sort_members<'m>(
    members: Vec<&'m Member>,
    model: &Model,
    module_py: &str,
) -> CastResult<Vec<&'m Member>> {
    let (mut sorted, mut pending): (Vec<&Member>, Vec<&Member>) =
        members.into_iter().partition(|m| m.sortable_fqn().is_none());

    let mut dependencies = Vec::with_capacity(pending.len());
    for member in &pending {
        let fqn = member.sortable_fqn().unwrap_or_default();
        let decl = model.declaration(fqn)?;
        let deps: Vec<String> = depends_on(decl, model, module_py)?
            .into_iter()
            .filter(|d| !d.is_module())
            .map(|d| d.fqn().to_string())
            .collect();
        dependencies.push(deps);
    }

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut pass = 0;
    while !pending.is_empty() {
        pass += 1;
        let mut remaining = Vec::new();
        let mut remaining_deps = Vec::new();
        let before = sorted.len();

        for (member, deps) in pending.into_iter().zip(dependencies) {
            if deps.iter().all(|d| seen.contains(d)) {
                if let Some(fqn) = member.sortable_fqn() {
                    seen.insert(fqn.to_string());
                }
                sorted.push(member);
            } else {
                remaining.push(member);
                remaining_deps.push(deps);
            }
        }

        if sorted.len() == before {
            return Err(CastError::CircularDependency {
                leftover: remaining.iter().map(|m| m.python_name().to_string()).collect(),
            });
        }
        debug!(pass, placed = sorted.len() - before, left = remaining.len(), "sorter pass");

        pending = remaining;
        dependencies = remaining_deps;
    }

    Ok(sorted)
}
