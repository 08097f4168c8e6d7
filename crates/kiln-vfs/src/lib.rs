//! Virtual file system layer for Kiln.
//!
//! The VFS is responsible for:
//! - In-memory file stores used to stage generated sources and collect compiler output.
//! - Representing file change events and a pluggable watcher interface for
//!   development-mode recompilation.

mod change;
mod memory_fs;
mod watch;

pub use change::{FileChange, FileChangeKind};
pub use memory_fs::{MemoryFs, VfsError};
pub use watch::{
    FileWatcher, ManualFileWatcher, ManualFileWatcherHandle, WatchEvent, WatchMessage, WatchMode,
};

#[cfg(feature = "watch-notify")]
pub use watch::NotifyFileWatcher;
