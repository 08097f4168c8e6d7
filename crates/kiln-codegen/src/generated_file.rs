use serde::{Deserialize, Serialize};

/// Generation-time tag of a generated unit.
///
/// The tag is not recoverable from compiled output, so registration consults it
/// on the pre-compilation file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratedFileType {
    #[default]
    Generic,
    /// An HTTP resource the host exposes over REST.
    Rest,
}

/// A generated source file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    kind: GeneratedFileType,
    relative_path: String,
    contents: Vec<u8>,
}

impl GeneratedFile {
    pub fn new(
        kind: GeneratedFileType,
        relative_path: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            kind,
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }

    pub fn generic(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self::new(GeneratedFileType::Generic, relative_path, contents)
    }

    pub fn rest(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self::new(GeneratedFileType::Rest, relative_path, contents)
    }

    pub fn kind(&self) -> GeneratedFileType {
        self.kind
    }

    /// Path relative to the generated-sources root (`org/kie/Foo.java`).
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Whether this file is a Java source to compile. Anything else (module
    /// descriptors, copied assets) is never staged for the compiler.
    pub fn is_java_source(&self) -> bool {
        self.relative_path.ends_with(kiln_core::JAVA_SUFFIX)
    }

    pub fn class_name(&self) -> String {
        kiln_core::to_logical_name(&self.relative_path)
    }

    /// Path this file occupies in the batch's source store. Only meaningful
    /// for [`is_java_source`](Self::is_java_source) files.
    pub fn staging_path(&self) -> String {
        kiln_core::to_staging_path(&self.class_name())
    }
}
