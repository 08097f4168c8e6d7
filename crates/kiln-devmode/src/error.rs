use std::path::PathBuf;

use kiln_codegen::GenerationError;
use kiln_compiler::CompileError;
use thiserror::Error;

/// Failure of one provider batch. Never fatal to the session.
#[derive(Debug, Error)]
pub enum RecompileError {
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Compiler(#[from] CompileError),

    #[error("compilation failed:\n{message}")]
    Compilation { message: String },

    #[error("a provider for `{0}` is already registered")]
    DuplicateProvider(String),
}

pub type Result<T> = std::result::Result<T, RecompileError>;
