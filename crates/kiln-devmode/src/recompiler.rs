use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use kiln_compiler::{CompileContext, Diagnostic};
use kiln_vfs::{FileChange, FileChangeKind, WatchEvent};

use crate::error::RecompileError;
use crate::registry::ProviderRegistry;
use crate::staleness::FileState;

/// A provider batch that failed. The session continues.
#[derive(Debug)]
pub struct ProviderFailure {
    pub extension: String,
    pub files: BTreeSet<PathBuf>,
    pub error: RecompileError,
}

/// Outcome of processing one group of file changes.
#[derive(Debug, Default)]
pub struct RecompileReport {
    /// Final state of every file that had a registered provider.
    pub states: BTreeMap<PathBuf, FileState>,
    /// Changed files no provider handles, or outside every source root.
    pub ignored: Vec<PathBuf>,
    /// Stale files handed to a provider, per extension.
    pub recompiled: BTreeMap<String, BTreeSet<PathBuf>>,
    /// Class files written by successful providers.
    pub written: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
    pub failures: Vec<ProviderFailure>,
}

impl RecompileReport {
    pub fn state(&self, path: &Path) -> FileState {
        self.states.get(path).copied().unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the incremental path: file changes in, provider batches out.
#[derive(Debug)]
pub struct IncrementalRecompiler {
    registry: ProviderRegistry,
    source_roots: Vec<PathBuf>,
    context: CompileContext,
}

impl IncrementalRecompiler {
    /// `context.output_directory` doubles as the classes directory staleness
    /// is measured against.
    pub fn new(registry: ProviderRegistry, context: CompileContext) -> Self {
        Self {
            registry,
            source_roots: Vec::new(),
            context,
        }
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// The deepest source root containing `path`, so nested roots
    /// (`src/main` and `src/main/java`) map classes relative to the inner one.
    fn source_root_of(&self, path: &Path) -> Option<&Path> {
        self.source_roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// Handles one watcher event. A rescan re-evaluates every file with a
    /// registered extension under the source roots.
    pub fn process_event(&self, event: &WatchEvent) -> RecompileReport {
        match event {
            WatchEvent::Changes { changes } => self.process(changes),
            WatchEvent::Rescan => self.process(&self.scan()),
        }
    }

    fn scan(&self) -> Vec<FileChange> {
        let mut changes = Vec::new();
        for root in &self.source_roots {
            for extension in self.registry.extensions() {
                match kiln_core::fs::collect_files_with_extension(root, extension) {
                    Ok(files) => changes.extend(files.into_iter().map(FileChange::modified)),
                    Err(err) => tracing::warn!(
                        target: "kiln.devmode",
                        root = %root.display(),
                        error = %err,
                        "rescan failed"
                    ),
                }
            }
        }
        changes
    }

    /// Evaluates `changes` in order against the filesystem as it is now, then
    /// runs one compile per provider over its stale files.
    pub fn process(&self, changes: &[FileChange]) -> RecompileReport {
        let mut report = RecompileReport::default();
        let classes_dir = self.context.output_directory();

        for change in changes {
            let path = change.path();
            if change.kind == FileChangeKind::Deleted {
                tracing::debug!(target: "kiln.devmode", path = %path.display(), "ignoring deletion");
                continue;
            }
            let Some(provider) = self.registry.for_path(path) else {
                report.ignored.push(path.to_path_buf());
                continue;
            };
            let Some(sources_dir) = self.source_root_of(path) else {
                report.ignored.push(path.to_path_buf());
                continue;
            };

            report.states.insert(path.to_path_buf(), FileState::Checked);
            let source_mod = match kiln_core::fs::modified_millis(path) {
                Ok(millis) => millis,
                Err(err) => {
                    // Gone again before it could be checked.
                    tracing::debug!(
                        target: "kiln.devmode",
                        path = %path.display(),
                        error = %err,
                        "changed file vanished"
                    );
                    report.states.remove(path);
                    report.ignored.push(path.to_path_buf());
                    continue;
                }
            };

            let extension = provider.handled_extension();
            let stale =
                provider.resource_modified(path, sources_dir, classes_dir, extension, source_mod);
            let state = if stale { FileState::Stale } else { FileState::Fresh };
            report.states.insert(path.to_path_buf(), state);
            if stale {
                report
                    .recompiled
                    .entry(extension.to_string())
                    .or_default()
                    .insert(path.to_path_buf());
            }
        }

        for (extension, files) in &report.recompiled {
            let Some(provider) = self.registry.get(extension) else {
                continue;
            };
            match provider.compile(files, &self.context) {
                Ok(output) => {
                    tracing::info!(
                        target: "kiln.devmode",
                        extension = %extension,
                        files = files.len(),
                        written = output.written.len(),
                        "recompiled"
                    );
                    report.written.extend(output.written);
                    report.warnings.extend(output.warnings);
                }
                Err(error) => {
                    tracing::warn!(
                        target: "kiln.devmode",
                        extension = %extension,
                        files = files.len(),
                        error = %error,
                        "recompilation failed"
                    );
                    report.failures.push(ProviderFailure {
                        extension: extension.clone(),
                        files: files.clone(),
                        error,
                    });
                }
            }
        }

        report
    }
}
