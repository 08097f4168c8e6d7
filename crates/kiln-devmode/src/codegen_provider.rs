use std::collections::BTreeSet;
use std::path::PathBuf;

use kiln_codegen::{AssetTransform, GenerationContext, DEFAULT_APP_PACKAGE};
use kiln_compiler::CompileContext;
use kiln_core::JAVA_SUFFIX;

use crate::error::{RecompileError, Result};
use crate::java_provider::JavaCompilationProvider;
use crate::provider::{CompilationProvider, ProviderOutput};
use crate::staleness::{StalenessChecker, StalenessPolicy};

/// Regenerates sources for changed domain assets, then compiles them.
///
/// Generated files are written below the context's output directory and the
/// `.java` ones are handed to the wrapped [`JavaCompilationProvider`].
#[derive(Debug, Clone)]
pub struct CodegenCompilationProvider<T> {
    extension: String,
    transform: T,
    app_package: String,
    project_root: Option<PathBuf>,
    java: JavaCompilationProvider,
    checker: StalenessChecker,
}

impl<T: AssetTransform> CodegenCompilationProvider<T> {
    /// `extension` is normalized to carry its leading dot.
    pub fn new(extension: &str, transform: T, java: JavaCompilationProvider) -> Self {
        Self {
            extension: format!(".{}", extension.trim_start_matches('.')),
            transform,
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            project_root: None,
            java,
            checker: StalenessChecker::default(),
        }
    }

    pub fn with_app_package(mut self, app_package: impl Into<String>) -> Self {
        self.app_package = app_package.into();
        self
    }

    /// Root the transform resolves asset paths against. Defaults to the
    /// context's output directory.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_staleness_policy(mut self, policy: StalenessPolicy) -> Self {
        self.checker = StalenessChecker::new(policy);
        self
    }
}

impl<T: AssetTransform> CompilationProvider for CodegenCompilationProvider<T> {
    fn handled_extension(&self) -> &str {
        &self.extension
    }

    fn staleness_checker(&self) -> StalenessChecker {
        self.checker
    }

    fn compile(&self, files: &BTreeSet<PathBuf>, ctx: &CompileContext) -> Result<ProviderOutput> {
        let out = ctx.output_directory();
        let root = self.project_root.as_deref().unwrap_or(out);
        let gen_ctx = GenerationContext::new(root).with_app_package(&self.app_package);
        let assets: Vec<PathBuf> = files.iter().cloned().collect();
        let generated = self.transform.transform(&gen_ctx, &assets)?;

        let mut sources = BTreeSet::new();
        for file in &generated {
            let relative = file
                .relative_path()
                .strip_prefix("./")
                .unwrap_or(file.relative_path());
            let path = out.join(relative);
            kiln_core::fs::write_creating_dirs(&path, file.contents()).map_err(|source| {
                RecompileError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
            if relative.ends_with(JAVA_SUFFIX) {
                sources.insert(path);
            }
        }
        tracing::debug!(
            target: "kiln.devmode",
            extension = %self.extension,
            assets = files.len(),
            generated = generated.len(),
            "regenerated sources"
        );

        self.java.compile(&sources, ctx)
    }
}
