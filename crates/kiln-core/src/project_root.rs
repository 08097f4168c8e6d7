use std::path::{Path, PathBuf};

/// Conventional compiled-classes directory, relative to a Maven-style project root.
pub const COMPILED_OUTPUT_DIR: &str = "target/classes";

/// Resolves the project root for a compiled-classes directory.
///
/// `<root>/target/classes` resolves to `<root>`; any other path is already the root.
pub fn project_root_from_classes_dir(classes_dir: &Path) -> PathBuf {
    if classes_dir.ends_with(COMPILED_OUTPUT_DIR) {
        if let Some(root) = classes_dir.parent().and_then(Path::parent) {
            return root.to_path_buf();
        }
    }
    classes_dir.to_path_buf()
}
