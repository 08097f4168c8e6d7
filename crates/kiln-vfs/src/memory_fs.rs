use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VfsError {
    #[error("no such file in memory store: {0}")]
    NotFound(String),
}

/// In-memory mapping from logical path to byte content.
///
/// One instance holds staged sources for a batch and a second holds the
/// compiler output. Keys are `/`-separated relative paths. Enumeration order
/// is lexicographic so two runs over the same inputs observe the same order.
///
/// The store has a single-writer-then-read-only lifecycle: compilers only
/// receive `&MemoryFs`, so nothing can mutate a store while it is being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `contents` at `path`, replacing any existing entry.
    pub fn write(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn read(&self, path: &str) -> Result<&[u8], VfsError> {
        self.files
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> + '_ {
        self.files
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn estimated_bytes(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// Materializes every entry below `root`, creating directories as needed.
    pub fn write_to_dir(&self, root: &Path) -> io::Result<()> {
        for (path, bytes) in &self.files {
            kiln_core::fs::write_creating_dirs(&root.join(path), bytes)?;
        }
        Ok(())
    }

    /// Loads every file below `root` with `extension` (no leading dot), keyed by
    /// its `/`-separated path relative to `root`.
    pub fn load_dir(root: &Path, extension: &str) -> io::Result<Self> {
        let mut out = Self::new();
        for file in kiln_core::fs::collect_files_with_extension(root, extension)? {
            let Ok(relative) = file.strip_prefix(root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = std::fs::read(&file)?;
            out.write(key, bytes);
        }
        tracing::trace!(
            target: "kiln.vfs",
            root = %root.display(),
            files = out.len(),
            "loaded directory into memory store"
        );
        Ok(out)
    }
}
