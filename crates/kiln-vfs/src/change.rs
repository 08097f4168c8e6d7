use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A single file change reported by a watcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<PathBuf>, kind: FileChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileChangeKind::Modified)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

