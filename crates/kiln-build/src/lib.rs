//! Full-build pipeline: generate, stage, compile once, register.
//!
//! A build either publishes every compiled artifact of its batch or nothing at
//! all. Publication goes through [`BuildSinks`], which the host implements.

mod pipeline;
mod registrar;
mod sinks;

pub use pipeline::{BuildPipeline, BuildReport, FEATURE_NAME};
pub use registrar::{ArtifactRegistrar, Registration, RestPolicy, REST_RESOURCES_INIT_PARAM};
pub use sinks::{BuildSinks, Publication, RecordingSinks};

use kiln_codegen::GenerationError;
use kiln_compiler::CompileError;
use kiln_vfs::VfsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Every error diagnostic of the batch, one per line.
    #[error("compilation failed:\n{message}")]
    Compilation { message: String },

    /// The compiler reported success but produced nothing for a non-empty batch.
    #[error("compiler produced no output for {sources} staged sources")]
    EmptyOutput { sources: usize },

    #[error(transparent)]
    Compiler(#[from] CompileError),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
