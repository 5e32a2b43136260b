//! PackageBuilder for generating a python package from an assembly
//!
//! Everything is rendered into memory first; files are only written once
//! every module rendered successfully.

use crate::codegen::python::PythonGenerator;
use crate::diagnostics::{CastError, CastResult};
use crate::ir::Assembly;
use crate::model::Model;
use crate::resolver::AliasTable;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rendered files, keyed by path relative to the package root
pub type PackageFiles = BTreeMap<PathBuf, String>;

/// Result of writing a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Output directory
    pub root: PathBuf,
    /// Written files, relative to `root`
    pub files: Vec<PathBuf>,
    /// Number of python modules among the files
    pub modules: usize,
    /// Total size of the written files
    pub bytes: usize,
}

/// Builder for a generated python package
///
/// # Example
/// ```ignore
/// use forge_cast::build::PackageBuilder;
///
/// let output = PackageBuilder::new(assembly)
///     .dependencies(deps)
///     .output_dir("dist/python")
///     .runtime_type_checking(true)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    assembly: Assembly,
    dependencies: Vec<Assembly>,
    output_dir: Option<PathBuf>,
    runtime_type_checking: bool,
}

impl PackageBuilder {
    /// Create a builder for `assembly`
    pub fn new(assembly: Assembly) -> Self {
        Self {
            assembly,
            dependencies: Vec::new(),
            output_dir: None,
            runtime_type_checking: true,
        }
    }

    /// Add a dependency assembly to the dependency index
    pub fn dependency(mut self, dependency: Assembly) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Add several dependency assemblies
    pub fn dependencies(mut self, dependencies: impl IntoIterator<Item = Assembly>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Set the directory the package is written to
    pub fn output_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Toggle runtime type checks in generated bodies
    pub fn runtime_type_checking(mut self, enabled: bool) -> Self {
        self.runtime_type_checking = enabled;
        self
    }

    /// Build the declaration model
    pub fn model(&self) -> CastResult<Model> {
        Model::build(self.assembly.clone(), self.dependencies.clone())
    }

    /// Render every file of the package
    pub fn generate(&self) -> CastResult<PackageFiles> {
        let model = self.model()?;
        AliasTable::collect(&model)?.verify()?;

        let modules = PythonGenerator::new(&model)
            .with_runtime_type_checking(self.runtime_type_checking)
            .generate()?;

        let mut files = PackageFiles::new();
        for module in modules {
            debug!(module = %module.python_name, "rendered module");
            files.insert(module.file_path(), module.source);
        }

        let root_module = model
            .declaration(&self.assembly.name)?
            .name
            .split('.')
            .fold(PathBuf::from("src"), |path, segment| path.join(segment));
        files.insert(root_module.join("py.typed"), String::new());
        files.insert(PathBuf::from("README.md"), self.readme());
        Ok(files)
    }

    fn readme(&self) -> String {
        match &self.assembly.readme {
            Some(readme) => readme.markdown.clone(),
            None => {
                let title = self.assembly.dist_name();
                format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
            }
        }
    }

    /// Render the package and write it to the output directory
    pub fn build(self) -> CastResult<BuildOutput> {
        let root = self
            .output_dir
            .clone()
            .ok_or_else(|| CastError::config("No output directory configured"))?;
        let files = self.generate()?;

        let mut output = BuildOutput {
            root: root.clone(),
            files: Vec::with_capacity(files.len()),
            modules: 0,
            bytes: 0,
        };
        for (relative, content) in files {
            let path = root.join(&relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &content)?;

            if relative.extension().map_or(false, |ext| ext == "py") {
                output.modules += 1;
            }
            output.bytes += content.len();
            output.files.push(relative);
        }

        info!(
            root = %output.root.display(),
            files = output.files.len(),
            modules = output.modules,
            "package written"
        );
        Ok(output)
    }
}
