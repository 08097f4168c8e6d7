//! Core shared types and helpers for Kiln.
//!
//! This crate is intentionally small and dependency-free. It owns the
//! translation between the three encodings of a class identity used across
//! the pipeline (dotted class name, staged source path, compiled class path).

pub mod class_name;
pub mod fs;
mod project_root;

pub use class_name::{
    is_valid_class_name, output_class_file, to_class_file_path, to_logical_name,
    to_staging_path, CLASS_SUFFIX, JAVA_SUFFIX, STAGING_PREFIX,
};
pub use project_root::{project_root_from_classes_dir, COMPILED_OUTPUT_DIR};
