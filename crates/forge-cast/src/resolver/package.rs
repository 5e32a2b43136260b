//! Python package names
//!
//! Maps an IR FQN onto the python package that hosts it, honoring
//! per-submodule package overrides. Works for the assembly being generated
//! and for every assembly of its dependency closure.

use crate::diagnostics::{CastError, CastResult};
use crate::ir::{Assembly, SubmoduleConfig, Targets};
use crate::symbol::naming::{to_python_identifier, to_snake_case};
use std::collections::BTreeMap;

/// Package part and non-package tail of an FQN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName {
    pub assembly_name: String,
    pub package_name: String,
    /// IR segments below the package (type and nested type names)
    pub tail: Vec<String>,
}

/// Python view of an FQN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonFqn {
    pub assembly_name: String,
    pub package_name: String,
    pub python_fqn: String,
}

/// Target configuration of one assembly (local or dependency)
struct AssemblyTargets<'a> {
    targets: &'a Targets,
    submodules: &'a BTreeMap<String, SubmoduleConfig>,
}

fn targets_for<'a>(assembly_name: &str, root: &'a Assembly) -> CastResult<AssemblyTargets<'a>> {
    if assembly_name == root.name {
        return Ok(AssemblyTargets {
            targets: &root.targets,
            submodules: &root.submodules,
        });
    }
    let dep = root.dependency_closure.get(assembly_name).ok_or_else(|| {
        CastError::config(format!(
            "Unable to find configuration for assembly \"{}\" in dependency closure",
            assembly_name
        ))
    })?;
    Ok(AssemblyTargets {
        targets: &dep.targets,
        submodules: &dep.submodules,
    })
}

/// Root python module of an assembly
pub fn root_module(assembly_name: &str, root: &Assembly) -> CastResult<String> {
    let config = targets_for(assembly_name, root)?;
    config
        .targets
        .python
        .as_ref()
        .map(|p| p.module.clone())
        .ok_or_else(|| {
            CastError::config(format!(
                "No Python target was configured in assembly \"{}\"",
                assembly_name
            ))
        })
}

/// Compute the python package of an FQN
///
/// Walks prefixes from longest to shortest. The first configured submodule
/// (or the assembly itself) anchors the package; unconfigured submodules
/// contribute their snake_cased name; anything else is tail.
pub fn package_name(fqn: &str, root: &Assembly) -> CastResult<PackageName> {
    let segments: Vec<&str> = fqn.split('.').collect();
    let assembly_name = segments[0].to_string();
    let config = targets_for(&assembly_name, root)?;
    let root_pkg = root_module(&assembly_name, root)?;

    let mut pkg: Vec<String> = Vec::new();
    let mut tail: Vec<String> = Vec::new();

    for len in (1..=segments.len()).rev() {
        let submodule = segments[..len].join(".");
        if submodule == assembly_name {
            pkg.insert(0, root_pkg.clone());
            break;
        }

        let Some(submodule_config) = config.submodules.get(&submodule) else {
            tail.insert(0, segments[len - 1].to_string());
            continue;
        };

        if let Some(sub_package) = submodule_config.targets.python.as_ref().map(|p| &p.module) {
            if !sub_package.starts_with(&format!("{}.", root_pkg)) {
                return Err(CastError::config(format!(
                    "Submodule \"{}\" is mapped to Python sub-package \"{}\" which isn't nested under \"{}\"!",
                    submodule, sub_package, root_pkg
                )));
            }
            pkg.insert(0, sub_package.clone());
            break;
        }

        pkg.insert(0, to_snake_case(&to_python_identifier(segments[len - 1])));
    }

    Ok(PackageName {
        assembly_name,
        package_name: pkg.join("."),
        tail,
    })
}

/// Compute the python FQN of an IR FQN
pub fn python_fqn(fqn: &str, root: &Assembly) -> CastResult<PythonFqn> {
    let PackageName {
        assembly_name,
        package_name,
        tail,
    } = package_name(fqn, root)?;

    let mut parts = vec![package_name.clone()];
    parts.extend(tail.iter().map(|t| to_python_identifier(t)));

    Ok(PythonFqn {
        assembly_name,
        package_name,
        python_fqn: parts.join("."),
    })
}
