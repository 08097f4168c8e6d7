//! File watching.
//!
//! [`FileWatcher`] is the watcher abstraction consumed by the development-mode
//! recompiler. Backends normalize OS events into [`FileChange`] batches and
//! deliver them over a `crossbeam_channel` stream so consumers can drive their
//! own event loop.
//!
//! Backends are allowed to be lossy: when events are dropped the watcher emits
//! [`WatchEvent::Rescan`] and consumers should re-check the watched roots.
//! Consumers treat events as hints and consult the filesystem for the
//! authoritative state at the time they process an event.
//!
//! Tests should use [`ManualFileWatcher`] rather than real OS timing.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crossbeam_channel as channel;

use crate::change::FileChange;

/// An event produced by a file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// One or more normalized file changes.
    Changes { changes: Vec<FileChange> },
    /// The watcher dropped events; consumers should rescan watched roots.
    Rescan,
}

impl WatchEvent {
    /// Returns the file changes contained in this event. Empty for [`WatchEvent::Rescan`].
    pub fn changes(&self) -> &[FileChange] {
        match self {
            WatchEvent::Changes { changes } => changes,
            WatchEvent::Rescan => &[],
        }
    }
}

/// Controls whether a directory watch should recurse into subdirectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchMode {
    Recursive,
    NonRecursive,
}

/// Message type delivered by a [`FileWatcher`]; backends surface asynchronous
/// errors on the same stream.
pub type WatchMessage = io::Result<WatchEvent>;

pub trait FileWatcher: Send {
    fn watch_path(&mut self, path: &Path, mode: WatchMode) -> io::Result<()>;

    fn unwatch_path(&mut self, path: &Path) -> io::Result<()>;

    fn watch_root(&mut self, root: &Path) -> io::Result<()> {
        self.watch_path(root, WatchMode::Recursive)
    }

    fn receiver(&self) -> &channel::Receiver<WatchMessage>;

    /// Drains all currently pending events without blocking.
    fn poll(&mut self) -> io::Result<Vec<WatchEvent>> {
        let mut out = Vec::new();
        for msg in self.receiver().try_iter() {
            out.push(msg?);
        }
        Ok(out)
    }
}

impl<W: ?Sized + FileWatcher> FileWatcher for Box<W> {
    fn watch_path(&mut self, path: &Path, mode: WatchMode) -> io::Result<()> {
        self.as_mut().watch_path(path, mode)
    }

    fn unwatch_path(&mut self, path: &Path) -> io::Result<()> {
        self.as_mut().unwatch_path(path)
    }

    fn receiver(&self) -> &channel::Receiver<WatchMessage> {
        self.as_ref().receiver()
    }
}

const MANUAL_WATCH_QUEUE_CAPACITY: usize = 1024;

/// Deterministic watcher for tests. Events are injected with
/// [`ManualFileWatcher::push`] or through a [`ManualFileWatcherHandle`].
#[derive(Debug)]
pub struct ManualFileWatcher {
    tx: channel::Sender<WatchMessage>,
    rx: channel::Receiver<WatchMessage>,
    watched: HashMap<PathBuf, WatchMode>,
}

/// Cloneable injection handle for a [`ManualFileWatcher`] that has been moved elsewhere.
#[derive(Debug, Clone)]
pub struct ManualFileWatcherHandle {
    tx: channel::Sender<WatchMessage>,
}

impl ManualFileWatcherHandle {
    pub fn push(&self, event: WatchEvent) -> io::Result<()> {
        send(&self.tx, Ok(event))
    }

    pub fn push_error(&self, error: io::Error) -> io::Result<()> {
        send(&self.tx, Err(error))
    }
}

fn send(tx: &channel::Sender<WatchMessage>, msg: WatchMessage) -> io::Result<()> {
    match tx.try_send(msg) {
        Ok(()) => Ok(()),
        Err(channel::TrySendError::Full(_)) => Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "watch queue is full",
        )),
        Err(channel::TrySendError::Disconnected(_)) => Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "watch receiver dropped",
        )),
    }
}

impl Default for ManualFileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualFileWatcher {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(MANUAL_WATCH_QUEUE_CAPACITY);
        Self {
            tx,
            rx,
            watched: HashMap::new(),
        }
    }

    pub fn handle(&self) -> ManualFileWatcherHandle {
        ManualFileWatcherHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: WatchEvent) -> io::Result<()> {
        self.handle().push(event)
    }

    pub fn push_error(&self, error: io::Error) -> io::Result<()> {
        self.handle().push_error(error)
    }

    /// Currently watched paths and their modes (sorted for determinism).
    pub fn watched_paths(&self) -> Vec<(PathBuf, WatchMode)> {
        let mut out: Vec<(PathBuf, WatchMode)> =
            self.watched.iter().map(|(p, m)| (p.clone(), *m)).collect();
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }
}

impl FileWatcher for ManualFileWatcher {
    fn watch_path(&mut self, path: &Path, mode: WatchMode) -> io::Result<()> {
        // Never downgrade a recursive watch.
        let mode = match self.watched.get(path) {
            Some(WatchMode::Recursive) => WatchMode::Recursive,
            _ => mode,
        };
        self.watched.insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn unwatch_path(&mut self, path: &Path) -> io::Result<()> {
        self.watched.remove(path);
        Ok(())
    }

    fn receiver(&self) -> &channel::Receiver<WatchMessage> {
        &self.rx
    }
}

#[cfg(any(test, feature = "watch-notify"))]
mod notify_impl {
    use super::*;

    use crate::change::FileChangeKind;
    use notify::EventKind;

    fn requests_rescan(event: &notify::Event) -> bool {
        matches!(event.attrs.flag(), Some(notify::event::Flag::Rescan))
            || (matches!(event.kind, EventKind::Other) && event.paths.is_empty())
    }

    /// Maps a raw notify event to a watch event. Access events are dropped.
    pub(crate) fn normalize_event(event: notify::Event) -> Option<WatchEvent> {
        if requests_rescan(&event) {
            return Some(WatchEvent::Rescan);
        }

        let kind = match event.kind {
            EventKind::Create(_) => FileChangeKind::Created,
            EventKind::Remove(_) => FileChangeKind::Deleted,
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => FileChangeKind::Modified,
            EventKind::Access(_) => return None,
        };

        let changes: Vec<FileChange> = event
            .paths
            .into_iter()
            .map(|path| FileChange::new(path, kind))
            .collect();
        if changes.is_empty() {
            return None;
        }
        Some(WatchEvent::Changes { changes })
    }

    #[cfg(feature = "watch-notify")]
    pub(crate) fn notify_error_to_io(err: notify::Error) -> io::Error {
        match err.kind {
            notify::ErrorKind::Io(err) => err,
            other => io::Error::new(io::ErrorKind::Other, format!("{other:?}")),
        }
    }
}

#[cfg(feature = "watch-notify")]
pub use notify_backend::NotifyFileWatcher;

#[cfg(feature = "watch-notify")]
mod notify_backend {
    use super::notify_impl::{normalize_event, notify_error_to_io};
    use super::*;

    use notify::{RecursiveMode, Watcher};

    const EVENTS_QUEUE_CAPACITY: usize = 4096;

    /// OS file watcher backed by `notify`.
    ///
    /// Events are pushed from notify's callback thread into a bounded queue. On
    /// overflow the event is dropped and a best-effort [`WatchEvent::Rescan`] is queued.
    pub struct NotifyFileWatcher {
        watcher: notify::RecommendedWatcher,
        rx: channel::Receiver<WatchMessage>,
    }

    impl std::fmt::Debug for NotifyFileWatcher {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("NotifyFileWatcher").finish_non_exhaustive()
        }
    }

    impl NotifyFileWatcher {
        pub fn new() -> io::Result<Self> {
            let (tx, rx) = channel::bounded::<WatchMessage>(EVENTS_QUEUE_CAPACITY);
            let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                let msg = match res {
                    Ok(event) => match normalize_event(event) {
                        Some(event) => Ok(event),
                        None => return,
                    },
                    Err(err) => Err(notify_error_to_io(err)),
                };
                if tx.try_send(msg).is_err() {
                    tracing::debug!(target: "kiln.vfs", "watch queue overflowed; requesting rescan");
                    let _ = tx.try_send(Ok(WatchEvent::Rescan));
                }
            })
            .map_err(notify_error_to_io)?;

            Ok(Self { watcher, rx })
        }
    }

    impl FileWatcher for NotifyFileWatcher {
        fn watch_path(&mut self, path: &Path, mode: WatchMode) -> io::Result<()> {
            let mode = match mode {
                WatchMode::Recursive => RecursiveMode::Recursive,
                WatchMode::NonRecursive => RecursiveMode::NonRecursive,
            };
            self.watcher.watch(path, mode).map_err(notify_error_to_io)
        }

        fn unwatch_path(&mut self, path: &Path) -> io::Result<()> {
            self.watcher.unwatch(path).map_err(notify_error_to_io)
        }

        fn receiver(&self) -> &channel::Receiver<WatchMessage> {
            &self.rx
        }
    }
}
