use crate::generated_file::GeneratedFile;

/// A host-supplied source appended last to every non-empty batch.
///
/// Its class name is reserved: the compiled class is published as an
/// injectable bean, and no generator may emit a class with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSource {
    class_name: String,
    source: String,
}

impl BootstrapSource {
    pub fn new(class_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            source: source.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn to_generated_file(&self) -> GeneratedFile {
        let relative = format!(
            "{}{}",
            self.class_name.replace('.', "/"),
            kiln_core::JAVA_SUFFIX
        );
        GeneratedFile::generic(relative, self.source.as_bytes())
    }
}
