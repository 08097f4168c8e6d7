//! Translation between the path spaces that encode a class identity.
//!
//! - *logical name*: dotted binary class name (`org.kie.gen.HelloResource`)
//! - *staging path*: where generated source text is staged before compilation
//!   (`src/main/java/org/kie/gen/HelloResource.java`)
//! - *class file path*: compiler output, relative to an output root
//!   (`org/kie/gen/HelloResource.class`)
//!
//! Every other crate goes through these functions instead of doing its own
//! string surgery.

use std::path::{Path, PathBuf};

/// Prefix under which generated sources are staged in the source store.
pub const STAGING_PREFIX: &str = "src/main/java/";
pub const JAVA_SUFFIX: &str = ".java";
pub const CLASS_SUFFIX: &str = ".class";

/// Converts a relative source, staging or class-file path into a dotted class name.
///
/// Strips a leading `./` and a trailing `.java` or `.class` suffix, then
/// replaces path separators with dots. Source paths (`.java`) additionally
/// lose the staging prefix when present; class-file paths never carry it.
pub fn to_logical_name(path: &str) -> String {
    let name = path.strip_prefix("./").unwrap_or(path);
    let name = match name.strip_suffix(JAVA_SUFFIX) {
        Some(source) => source.strip_prefix(STAGING_PREFIX).unwrap_or(source),
        None => name.strip_suffix(CLASS_SUFFIX).unwrap_or(name),
    };
    name.replace(['/', '\\'], ".")
}

/// Inverse of [`to_logical_name`] for the source store.
pub fn to_staging_path(class_name: &str) -> String {
    format!(
        "{STAGING_PREFIX}{}{JAVA_SUFFIX}",
        class_name.replace('.', "/")
    )
}

/// Relative path of the compiled class file for `class_name`.
pub fn to_class_file_path(class_name: &str) -> String {
    format!("{}{CLASS_SUFFIX}", class_name.replace('.', "/"))
}

/// Returns whether `name` is a dot-separated sequence of ASCII Java identifiers.
pub fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Maps an on-disk source file to the compiled output it is expected to produce.
///
/// `matching_extension` includes the leading dot (`.java`). Returns `None` when
/// `resource` is not under `sources_dir`, does not end with `matching_extension`,
/// or is not valid UTF-8; callers decide what an unmapped file means.
pub fn output_class_file(
    resource: &Path,
    sources_dir: &Path,
    classes_dir: &Path,
    matching_extension: &str,
) -> Option<PathBuf> {
    let relative = resource.strip_prefix(sources_dir).ok()?;
    let relative = relative.to_str()?;
    let stem = relative.strip_suffix(matching_extension)?;
    if stem.is_empty() {
        return None;
    }
    Some(classes_dir.join(format!("{stem}{CLASS_SUFFIX}")))
}
