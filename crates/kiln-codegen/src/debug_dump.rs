use std::path::{Path, PathBuf};

use crate::generated_file::GeneratedFile;

/// Optional mirror of generated sources on disk for inspection.
///
/// Writes are best-effort: a failure is logged and never affects compilation
/// or registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugDump {
    dir: Option<PathBuf>,
}

impl DebugDump {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Writes every file verbatim below the configured directory. Returns the
    /// number of files written.
    pub fn write_all(&self, files: &[GeneratedFile]) -> usize {
        let Some(dir) = &self.dir else {
            return 0;
        };

        let mut written = 0;
        for file in files {
            let relative = file
                .relative_path()
                .strip_prefix("./")
                .unwrap_or(file.relative_path());
            let path = dir.join(relative);
            match kiln_core::fs::write_creating_dirs(&path, file.contents()) {
                Ok(()) => written += 1,
                Err(err) => {
                    tracing::warn!(
                        target: "kiln.codegen",
                        path = %path.display(),
                        error = %err,
                        "failed to write generated source to debug directory"
                    );
                }
            }
        }
        tracing::debug!(
            target: "kiln.codegen",
            dir = %dir.display(),
            written,
            "mirrored generated sources"
        );
        written
    }
}
