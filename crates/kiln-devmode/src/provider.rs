use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_compiler::{CompileContext, Diagnostic};

use crate::error::Result;
use crate::staleness::StalenessChecker;

/// Class files a provider wrote plus the warnings it saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOutput {
    pub written: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

/// Compiles raw files of one extension directly, outside the full batch.
pub trait CompilationProvider: Send + Sync {
    /// Extension with its leading dot (`.java`). Matched exactly.
    fn handled_extension(&self) -> &str;

    fn compile(&self, files: &BTreeSet<PathBuf>, ctx: &CompileContext) -> Result<ProviderOutput>;

    fn staleness_checker(&self) -> StalenessChecker {
        StalenessChecker::default()
    }

    /// Whether `resource` must be recompiled. `source_mod` is in milliseconds
    /// since the epoch.
    fn resource_modified(
        &self,
        resource: &Path,
        sources_dir: &Path,
        classes_dir: &Path,
        matching_extension: &str,
        source_mod: u64,
    ) -> bool {
        self.staleness_checker().is_stale(
            resource,
            sources_dir,
            classes_dir,
            matching_extension,
            source_mod,
        )
    }
}

impl<P: CompilationProvider + ?Sized> CompilationProvider for Arc<P> {
    fn handled_extension(&self) -> &str {
        (**self).handled_extension()
    }

    fn compile(&self, files: &BTreeSet<PathBuf>, ctx: &CompileContext) -> Result<ProviderOutput> {
        (**self).compile(files, ctx)
    }

    fn staleness_checker(&self) -> StalenessChecker {
        (**self).staleness_checker()
    }

    fn resource_modified(
        &self,
        resource: &Path,
        sources_dir: &Path,
        classes_dir: &Path,
        matching_extension: &str,
        source_mod: u64,
    ) -> bool {
        (**self).resource_modified(resource, sources_dir, classes_dir, matching_extension, source_mod)
    }
}
