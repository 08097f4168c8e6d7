//! Compiler capability for Kiln builds.
//!
//! A [`CompilerAdapter`] compiles an ordered list of staged sources from a
//! [`kiln_vfs::MemoryFs`] in one call. The outcome is all-or-nothing: either a
//! populated target store or a non-empty list of error diagnostics.
//!
//! [`JavacCompiler`] is the adapter backed by a `javac` executable.

mod command;
mod context;
mod diagnostic;
mod javac;
mod result;

pub use command::{CommandOutput, CommandRunner, DefaultCommandRunner};
pub use context::CompileContext;
pub use diagnostic::{Diagnostic, Severity};
pub use javac::{parse_javac_diagnostics, JavacCompiler};
pub use result::CompilationResult;

use kiln_vfs::{MemoryFs, VfsError};
use thiserror::Error;

/// Infrastructure failures of a compiler invocation.
///
/// Source errors reported by the compiler are not `CompileError`s; they are a
/// [`CompilationResult::Failure`].
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error("compiler command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Compiles a batch of staged sources.
///
/// Implementations run to completion once invoked; there is no cancellation
/// mid-compile.
pub trait CompilerAdapter: Send + Sync {
    fn compile(
        &self,
        source_names: &[String],
        sources: &MemoryFs,
        ctx: &CompileContext,
    ) -> Result<CompilationResult>;
}

impl<C: CompilerAdapter + ?Sized> CompilerAdapter for std::sync::Arc<C> {
    fn compile(
        &self,
        source_names: &[String],
        sources: &MemoryFs,
        ctx: &CompileContext,
    ) -> Result<CompilationResult> {
        (**self).compile(source_names, sources, ctx)
    }
}
