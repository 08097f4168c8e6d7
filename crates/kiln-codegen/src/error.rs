use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("generator `{generator}` failed: {message}")]
    Generator { generator: String, message: String },

    #[error("generated file `{0}` is produced more than once in a single batch")]
    DuplicatePath(String),

    #[error("generated class `{0}` collides with the reserved bootstrap class")]
    ReservedName(String),

    #[error("`{0}` is not a valid dotted class name")]
    InvalidClassName(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
