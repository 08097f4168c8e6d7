use kiln_vfs::MemoryFs;

use crate::diagnostic::Diagnostic;

/// Outcome of compiling one batch. Never partially successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationResult {
    Success {
        /// Compiled units keyed by class-file path (`org/kie/Foo.class`).
        target: MemoryFs,
        warnings: Vec<Diagnostic>,
    },
    Failure {
        /// Error diagnostics in compiler order; never empty.
        errors: Vec<Diagnostic>,
    },
}

impl CompilationResult {
    /// Classifies raw compiler diagnostics.
    ///
    /// Any error diagnostic fails the whole batch and `target` is discarded.
    pub fn from_diagnostics(target: MemoryFs, diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        if errors.is_empty() {
            CompilationResult::Success { target, warnings }
        } else {
            CompilationResult::Failure { errors }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompilationResult::Success { .. })
    }

    pub fn errors(&self) -> &[Diagnostic] {
        match self {
            CompilationResult::Success { .. } => &[],
            CompilationResult::Failure { errors } => errors,
        }
    }

    /// Concatenation of every error diagnostic, one per line.
    pub fn error_summary(&self) -> String {
        self.errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
