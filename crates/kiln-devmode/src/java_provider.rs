use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use kiln_compiler::{CompilationResult, CompileContext, CompilerAdapter, JavacCompiler};
use kiln_core::JAVA_SUFFIX;
use kiln_vfs::MemoryFs;

use crate::error::{RecompileError, Result};
use crate::provider::{CompilationProvider, ProviderOutput};
use crate::staleness::{StalenessChecker, StalenessPolicy};

/// Recompiles changed `.java` files into the context's output directory.
#[derive(Clone)]
pub struct JavaCompilationProvider {
    compiler: Arc<dyn CompilerAdapter>,
    checker: StalenessChecker,
}

impl std::fmt::Debug for JavaCompilationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaCompilationProvider")
            .field("checker", &self.checker)
            .finish_non_exhaustive()
    }
}

impl Default for JavaCompilationProvider {
    fn default() -> Self {
        Self::new(Arc::new(JavacCompiler::default()))
    }
}

impl JavaCompilationProvider {
    pub fn new(compiler: Arc<dyn CompilerAdapter>) -> Self {
        Self {
            compiler,
            checker: StalenessChecker::default(),
        }
    }

    pub fn with_staleness_policy(mut self, policy: StalenessPolicy) -> Self {
        self.checker = StalenessChecker::new(policy);
        self
    }

    fn stage(files: &BTreeSet<PathBuf>) -> Result<(Vec<String>, MemoryFs)> {
        let mut store = MemoryFs::new();
        let mut names = Vec::with_capacity(files.len());
        for file in files {
            let contents = std::fs::read(file).map_err(|source| RecompileError::Io {
                path: file.clone(),
                source,
            })?;
            let name = store_name(file);
            store.write(name.clone(), contents);
            names.push(name);
        }
        Ok((names, store))
    }
}

/// Store key for an on-disk source: its normal components joined by `/`.
fn store_name(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl CompilationProvider for JavaCompilationProvider {
    fn handled_extension(&self) -> &str {
        JAVA_SUFFIX
    }

    fn staleness_checker(&self) -> StalenessChecker {
        self.checker
    }

    fn compile(&self, files: &BTreeSet<PathBuf>, ctx: &CompileContext) -> Result<ProviderOutput> {
        if files.is_empty() {
            return Ok(ProviderOutput::default());
        }

        let (names, store) = Self::stage(files)?;
        // Unchanged classes from earlier builds must stay resolvable.
        let ctx = ctx
            .clone()
            .with_classpath([ctx.output_directory().to_path_buf()]);

        match self.compiler.compile(&names, &store, &ctx)? {
            CompilationResult::Success { target, warnings } => {
                let out = ctx.output_directory();
                target
                    .write_to_dir(out)
                    .map_err(|source| RecompileError::Io {
                        path: out.to_path_buf(),
                        source,
                    })?;
                let written = target.names().map(|name| out.join(name)).collect();
                Ok(ProviderOutput { written, warnings })
            }
            failure @ CompilationResult::Failure { .. } => Err(RecompileError::Compilation {
                message: failure.error_summary(),
            }),
        }
    }
}
