use std::io;
use std::path::Path;

use kiln_core::output_class_file;
use serde::{Deserialize, Serialize};

/// Per-file state of the incremental path.
///
/// `Unknown` until a change notification for a file with a registered
/// provider arrives, `Checked` while its staleness is evaluated, then `Stale`
/// (queued for recompilation) or `Fresh` (skipped).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    #[default]
    Unknown,
    Checked,
    Stale,
    Fresh,
}

/// Decision taken when staleness cannot be established: the source does not
/// map to an output path, or the output's modification time is unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StalenessPolicy {
    /// Recompile. Downstream output is never older than its source.
    #[default]
    AssumeStale,
    /// Skip. Avoids recompiles at the cost of possibly stale output.
    AssumeFresh,
}

impl StalenessPolicy {
    fn indeterminate(self) -> FileState {
        match self {
            StalenessPolicy::AssumeStale => FileState::Stale,
            StalenessPolicy::AssumeFresh => FileState::Fresh,
        }
    }
}

/// Compares a source file's modification time with its compiled output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StalenessChecker {
    policy: StalenessPolicy,
}

impl StalenessChecker {
    pub fn new(policy: StalenessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Classifies `resource` as [`FileState::Stale`] or [`FileState::Fresh`].
    ///
    /// `source_mod` is in milliseconds since the epoch. A missing output is
    /// always stale; an output whose modification time is not earlier than
    /// `source_mod` is fresh.
    pub fn check(
        &self,
        resource: &Path,
        sources_dir: &Path,
        classes_dir: &Path,
        matching_extension: &str,
        source_mod: u64,
    ) -> FileState {
        let Some(class_file) =
            output_class_file(resource, sources_dir, classes_dir, matching_extension)
        else {
            tracing::debug!(
                target: "kiln.devmode",
                resource = %resource.display(),
                policy = ?self.policy,
                "no output mapping for source"
            );
            return self.policy.indeterminate();
        };

        let state = match kiln_core::fs::modified_millis(&class_file) {
            Ok(output_mod) if output_mod >= source_mod => FileState::Fresh,
            Ok(_) => FileState::Stale,
            Err(err) if err.kind() == io::ErrorKind::NotFound => FileState::Stale,
            Err(err) => {
                tracing::debug!(
                    target: "kiln.devmode",
                    output = %class_file.display(),
                    error = %err,
                    policy = ?self.policy,
                    "cannot read output modification time"
                );
                self.policy.indeterminate()
            }
        };
        tracing::trace!(
            target: "kiln.devmode",
            resource = %resource.display(),
            output = %class_file.display(),
            ?state,
            "staleness checked"
        );
        state
    }

    pub fn is_stale(
        &self,
        resource: &Path,
        sources_dir: &Path,
        classes_dir: &Path,
        matching_extension: &str,
        source_mod: u64,
    ) -> bool {
        self.check(resource, sources_dir, classes_dir, matching_extension, source_mod)
            == FileState::Stale
    }
}
