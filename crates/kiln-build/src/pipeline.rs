use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_codegen::{DebugDump, GenerationContext, GeneratorPool, StagedSources, DEFAULT_APP_PACKAGE};
use kiln_compiler::{CompilationResult, CompileContext, CompilerAdapter, Diagnostic};
use kiln_core::project_root_from_classes_dir;
use kiln_vfs::MemoryFs;
use serde::Serialize;

use crate::registrar::{ArtifactRegistrar, Registration};
use crate::sinks::BuildSinks;
use crate::{BuildError, Result};

/// Capability name announced to the host after a successful build.
pub const FEATURE_NAME: &str = "kie";

/// What one successful [`BuildPipeline::run`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub project_root: PathBuf,
    pub generated_files: usize,
    pub debug_files_written: usize,
    pub registration: Registration,
    pub watched_assets: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

impl BuildReport {
    /// True when no generator produced output and nothing was compiled.
    pub fn is_empty(&self) -> bool {
        self.generated_files == 0
    }
}

/// Single-threaded generate → stage → compile → register pipeline.
#[derive(Debug)]
pub struct BuildPipeline<C> {
    pool: GeneratorPool,
    compiler: C,
    registrar: ArtifactRegistrar,
    debug_dump: DebugDump,
    app_package: String,
    dependency_injection: bool,
    classpath: BTreeSet<PathBuf>,
}

impl<C: CompilerAdapter> BuildPipeline<C> {
    pub fn new(pool: GeneratorPool, compiler: C) -> Self {
        Self {
            pool,
            compiler,
            registrar: ArtifactRegistrar::default(),
            debug_dump: DebugDump::disabled(),
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            dependency_injection: true,
            classpath: BTreeSet::new(),
        }
    }

    pub fn with_registrar(mut self, registrar: ArtifactRegistrar) -> Self {
        self.registrar = registrar;
        self
    }

    pub fn with_debug_dump(mut self, debug_dump: DebugDump) -> Self {
        self.debug_dump = debug_dump;
        self
    }

    pub fn with_app_package(mut self, app_package: impl Into<String>) -> Self {
        self.app_package = app_package.into();
        self
    }

    /// Forwarded to generators through [`GenerationContext::dependency_injection`].
    pub fn with_dependency_injection(mut self, enabled: bool) -> Self {
        self.dependency_injection = enabled;
        self
    }

    pub fn with_classpath(mut self, entries: impl IntoIterator<Item = PathBuf>) -> Self {
        self.classpath.extend(entries);
        self
    }

    pub fn pool(&self) -> &GeneratorPool {
        &self.pool
    }

    /// Runs one batch for the project owning `classes_dir`.
    ///
    /// Nothing reaches `sinks` unless the whole batch compiled. An empty batch
    /// returns an empty report without invoking the compiler.
    pub fn run(&self, classes_dir: &Path, sinks: &mut dyn BuildSinks) -> Result<BuildReport> {
        let project_root = project_root_from_classes_dir(classes_dir);
        let ctx = GenerationContext::new(&project_root)
            .with_app_package(&self.app_package)
            .with_dependency_injection(self.dependency_injection);

        let batch = self.pool.generate(&ctx)?;
        let mut report = BuildReport {
            project_root,
            generated_files: batch.len(),
            ..BuildReport::default()
        };
        if batch.is_empty() {
            tracing::debug!(
                target: "kiln.build",
                root = %report.project_root.display(),
                "no generated files; skipping compilation"
            );
            return Ok(report);
        }

        report.debug_files_written = self.debug_dump.write_all(batch.files());

        let staged = batch.stage();
        let (target, warnings) = if staged.names.is_empty() {
            tracing::debug!(
                target: "kiln.build",
                files = batch.len(),
                "batch has no java sources; skipping compilation"
            );
            (MemoryFs::new(), Vec::new())
        } else {
            self.compile(&staged, classes_dir)?
        };

        // Resolved before publishing so a discovery failure leaves the sinks untouched.
        let watched_assets = self.pool.watched_assets(&ctx)?;

        report.registration =
            self.registrar
                .register(&target, batch.files(), batch.bootstrap_class(), sinks);
        for asset in &watched_assets {
            sinks.hot_deployment_watch(asset);
        }
        sinks.feature(FEATURE_NAME);

        report.watched_assets = watched_assets;
        report.warnings = warnings;
        tracing::info!(
            target: "kiln.build",
            root = %report.project_root.display(),
            generated = report.generated_files,
            classes = report.registration.classes.len(),
            beans = report.registration.beans.len(),
            rest = report.registration.rest_resources.len(),
            warnings = report.warnings.len(),
            "build finished"
        );
        Ok(report)
    }

    fn compile(
        &self,
        staged: &StagedSources,
        classes_dir: &Path,
    ) -> Result<(MemoryFs, Vec<Diagnostic>)> {
        let compile_ctx = CompileContext::new(classes_dir).with_classpath(self.classpath.clone());
        tracing::debug!(
            target: "kiln.build",
            sources = staged.names.len(),
            bytes = staged.store.estimated_bytes(),
            "compiling batch"
        );
        match self
            .compiler
            .compile(&staged.names, &staged.store, &compile_ctx)?
        {
            CompilationResult::Success { target, .. } if target.is_empty() => {
                Err(BuildError::EmptyOutput {
                    sources: staged.names.len(),
                })
            }
            CompilationResult::Success { target, warnings } => Ok((target, warnings)),
            failure @ CompilationResult::Failure { .. } => {
                tracing::debug!(
                    target: "kiln.build",
                    errors = failure.errors().len(),
                    "batch failed to compile"
                );
                Err(BuildError::Compilation {
                    message: failure.error_summary(),
                })
            }
        }
    }
}
