//! Run configuration from forge-cast.toml
//!
//! ```toml
//! [generate]
//! assembly = "acme.jsii.json"
//! dependencies = ["../base/base.jsii.json"]
//! output = "dist/python"
//! runtime_type_checking = true
//! targets = ["python"]
//!
//! [modules.Acme]
//! python = "acme_lib"
//!
//! [modules.Acme.submodules]
//! "Acme.widgets" = "acme_lib.widgets"
//! ```

use crate::diagnostics::{CastError, CastResult};
use crate::ir::{Assembly, PythonTarget, SubmoduleConfig, Targets};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Target language of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Python,
    Php,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Python => "python",
            Target::Php => "php",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = CastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Target::Python),
            "php" => Ok(Target::Php),
            other => Err(CastError::config(format!("Unknown target \"{}\"", other))),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    pub generate: GenerateConfig,
    /// Target overrides keyed by assembly name
    pub modules: BTreeMap<String, ModuleOverrides>,
}

/// `[generate]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub assembly: Option<PathBuf>,
    pub dependencies: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub runtime_type_checking: bool,
    pub targets: Vec<Target>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            assembly: None,
            dependencies: Vec::new(),
            output: None,
            runtime_type_checking: true,
            targets: vec![Target::Python],
        }
    }
}

/// `[modules.<assembly>]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOverrides {
    /// Root python module
    pub python: Option<String>,
    /// Python package per submodule FQN
    pub submodules: BTreeMap<String, String>,
}

impl CastConfig {
    /// Parse a configuration document
    pub fn parse(content: &str) -> CastResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a configuration file
    ///
    /// Relative paths in `[generate]` are resolved against the directory of
    /// the file.
    pub fn load(path: impl AsRef<Path>) -> CastResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.generate.rebase(base);
        }
        debug!(path = %path.display(), overrides = config.modules.len(), "configuration loaded");
        Ok(config)
    }

    /// Merge the module overrides into an assembly and its dependency closure
    pub fn apply(&self, assembly: &mut Assembly) -> CastResult<()> {
        for (name, overrides) in &self.modules {
            if *name == assembly.name {
                overrides.merge(name, &mut assembly.targets, &mut assembly.submodules)?;
            } else if let Some(dep) = assembly.dependency_closure.get_mut(name) {
                overrides.merge(name, &mut dep.targets, &mut dep.submodules)?;
            } else {
                return Err(CastError::config(format!(
                    "Module overrides for \"{}\" match neither the assembly nor its dependency closure",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl GenerateConfig {
    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(assembly) = self.assembly.as_mut() {
            join(assembly);
        }
        if let Some(output) = self.output.as_mut() {
            join(output);
        }
        self.dependencies.iter_mut().for_each(join);
    }
}

impl ModuleOverrides {
    fn merge(
        &self,
        assembly_name: &str,
        targets: &mut Targets,
        submodules: &mut BTreeMap<String, SubmoduleConfig>,
    ) -> CastResult<()> {
        if let Some(module) = &self.python {
            set_python_module(targets, module);
        }

        let root = targets.python.as_ref().map(|p| p.module.clone()).ok_or_else(|| {
            CastError::config(format!(
                "No Python target was configured in assembly \"{}\"",
                assembly_name
            ))
        })?;

        for (fqn, package) in &self.submodules {
            if !fqn.starts_with(&format!("{}.", assembly_name)) {
                return Err(CastError::config(format!(
                    "Submodule \"{}\" does not belong to assembly \"{}\"",
                    fqn, assembly_name
                )));
            }
            if !package.starts_with(&format!("{}.", root)) {
                return Err(CastError::config(format!(
                    "Submodule \"{}\" is mapped to Python sub-package \"{}\" which isn't nested under \"{}\"!",
                    fqn, package, root
                )));
            }
            let config = submodules.entry(fqn.clone()).or_default();
            set_python_module(&mut config.targets, package);
        }
        Ok(())
    }
}

fn set_python_module(targets: &mut Targets, module: &str) {
    match targets.python.as_mut() {
        Some(python) => python.module = module.to_string(),
        None => {
            targets.python = Some(PythonTarget {
                module: module.to_string(),
                dist_name: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::assembly;

    #[test]
    fn test_defaults() {
        let config = CastConfig::parse("").unwrap();
        assert!(config.generate.runtime_type_checking);
        assert_eq!(config.generate.targets, vec![Target::Python]);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_parse_full_document() {
        let config = CastConfig::parse(
            r#"
            [generate]
            assembly = "acme.json"
            dependencies = ["base.json"]
            output = "out"
            runtime_type_checking = false
            targets = ["python", "php"]

            [modules.Acme]
            python = "acme_lib"

            [modules.Acme.submodules]
            "Acme.widgets" = "acme_lib.widgets"
            "#,
        )
        .unwrap();

        assert_eq!(config.generate.assembly, Some(PathBuf::from("acme.json")));
        assert!(!config.generate.runtime_type_checking);
        assert_eq!(config.generate.targets, vec![Target::Python, Target::Php]);
        let acme = &config.modules["Acme"];
        assert_eq!(acme.python.as_deref(), Some("acme_lib"));
        assert_eq!(acme.submodules["Acme.widgets"], "acme_lib.widgets");
    }

    #[test]
    fn test_parse_error() {
        let err = CastConfig::parse("[generate\n").unwrap_err();
        assert!(matches!(err, CastError::ConfigParse(_)));
    }

    #[test]
    fn test_apply_overrides() {
        let config = CastConfig::parse(
            r#"
            [modules.Acme]
            python = "acme_lib"
            submodules = { "Acme.widgets" = "acme_lib.widgets" }

            [modules.Base]
            python = "base2"
            "#,
        )
        .unwrap();
        let mut acme = assembly("Acme", "acme").with_dependency("Base", "^1.0.0", "base_lib");
        config.apply(&mut acme).unwrap();

        assert_eq!(acme.python_module(), Some("acme_lib"));
        let widgets = &acme.submodules["Acme.widgets"];
        assert_eq!(widgets.targets.python.as_ref().unwrap().module, "acme_lib.widgets");
        let base = &acme.dependency_closure["Base"];
        assert_eq!(base.targets.python.as_ref().unwrap().module, "base2");
    }

    #[test]
    fn test_apply_rejects_package_outside_root() {
        let config = CastConfig::parse(
            r#"
            [modules.Acme.submodules]
            "Acme.widgets" = "widgets"
            "#,
        )
        .unwrap();
        let mut acme = assembly("Acme", "acme");
        let err = config.apply(&mut acme).unwrap_err();
        assert!(err.to_string().contains("isn't nested under \"acme\""));
    }

    #[test]
    fn test_apply_rejects_unknown_assembly() {
        let config = CastConfig::parse("[modules.Other]\npython = \"other\"\n").unwrap();
        assert!(config.apply(&mut assembly("Acme", "acme")).is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge-cast.toml");
        fs::write(
            &path,
            "[generate]\nassembly = \"acme.json\"\ndependencies = [\"/abs/base.json\"]\n",
        )
        .unwrap();

        let config = CastConfig::load(&path).unwrap();
        assert_eq!(config.generate.assembly, Some(dir.path().join("acme.json")));
        assert_eq!(config.generate.dependencies, vec![PathBuf::from("/abs/base.json")]);
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("php".parse::<Target>().unwrap(), Target::Php);
        assert!("ruby".parse::<Target>().is_err());
    }
}
