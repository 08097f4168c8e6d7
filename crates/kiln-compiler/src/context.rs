use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Class-loading context forwarded opaquely to every compile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileContext {
    pub classpath: BTreeSet<PathBuf>,
    pub output_directory: PathBuf,
}

impl CompileContext {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            classpath: BTreeSet::new(),
            output_directory: output_directory.into(),
        }
    }

    pub fn with_classpath(mut self, entries: impl IntoIterator<Item = PathBuf>) -> Self {
        self.classpath.extend(entries);
        self
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }
}
