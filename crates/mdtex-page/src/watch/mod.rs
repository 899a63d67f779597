//! Watching the input file for changes.
//!
//! [`InputWatcher`] watches the directory containing the input file (so
//! rename-based saves are seen), filters events down to that file, debounces
//! them and delivers one [`FsEvent`] per quiet period.

mod debouncer;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

pub use debouncer::{FsEvent, FsEventKind};

use crate::error::PageError;
use debouncer::EventDebouncer;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Upper bound on how often pending events are checked.
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watches one file and reports debounced changes.
pub struct InputWatcher {
    path: PathBuf,
    debounce: Duration,
    watcher: Option<RecommendedWatcher>,
}

impl InputWatcher {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debounce: DEFAULT_DEBOUNCE,
            watcher: None,
        }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching.
    ///
    /// Returns a channel of debounced events for the input file. Watching
    /// stops when this `InputWatcher` is dropped; the background tasks stop
    /// when the receiver is dropped. Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the input path has no file name, its directory
    /// cannot be resolved, or the watcher cannot be created.
    pub fn start(&mut self) -> Result<mpsc::Receiver<FsEvent>, PageError> {
        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            PageError::Io {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "input path has no file name",
                ),
            }
        })?;
        let dir = watch_dir(&self.path);
        let dir = dir.canonicalize().map_err(|source| PageError::Io {
            path: dir.clone(),
            source,
        })?;

        let (raw_tx, mut raw_rx) = mpsc::channel::<Event>(100);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on notify's own thread
                Ok(event) => {
                    let _ = raw_tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);

        tracing::info!(path = %self.path.display(), dir = %dir.display(), "Watching input");

        let debouncer = Arc::new(EventDebouncer::new(self.debounce));
        let debouncer_for_record = Arc::clone(&debouncer);

        tokio::spawn(async move {
            while let Some(event) = raw_rx.recv().await {
                record_event(&event, &file_name, &debouncer_for_record);
            }
        });

        let (tx, rx) = mpsc::channel(16);
        let poll_interval = (self.debounce / 2).clamp(Duration::from_millis(1), MAX_POLL_INTERVAL);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            loop {
                interval.tick().await;
                for event in debouncer.drain_ready() {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// Directory to watch for `path`. A bare file name means the current directory.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn event_kind(kind: EventKind) -> Option<FsEventKind> {
    match kind {
        EventKind::Create(_) => Some(FsEventKind::Created),
        EventKind::Modify(_) => Some(FsEventKind::Modified),
        EventKind::Remove(_) => Some(FsEventKind::Removed),
        _ => None,
    }
}

fn record_event(event: &Event, file_name: &OsString, debouncer: &EventDebouncer) {
    let Some(kind) = event_kind(event.kind) else {
        return;
    };

    for path in &event.paths {
        if path.file_name() != Some(file_name.as_os_str()) {
            continue;
        }
        debouncer.record(path.clone(), kind);
        tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("doc.md")), PathBuf::from("."));
        assert_eq!(watch_dir(Path::new("notes/doc.md")), PathBuf::from("notes"));
        assert_eq!(watch_dir(Path::new("/tmp/doc.md")), PathBuf::from("/tmp"));
    }

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(
            event_kind(EventKind::Create(CreateKind::File)),
            Some(FsEventKind::Created)
        );
        assert_eq!(
            event_kind(EventKind::Modify(ModifyKind::Any)),
            Some(FsEventKind::Modified)
        );
        assert_eq!(
            event_kind(EventKind::Remove(RemoveKind::File)),
            Some(FsEventKind::Removed)
        );
        assert_eq!(event_kind(EventKind::Access(AccessKind::Any)), None);
    }

    #[test]
    fn test_record_event_filters_other_files() {
        let debouncer = EventDebouncer::new(Duration::ZERO);
        let event = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/notes/other.md"))
            .add_path(PathBuf::from("/notes/doc.md"));

        record_event(&event, &OsString::from("doc.md"), &debouncer);

        let events = debouncer.drain_ready();
        assert_eq!(
            events,
            vec![FsEvent {
                path: PathBuf::from("/notes/doc.md"),
                kind: FsEventKind::Modified,
            }]
        );
    }

    #[tokio::test]
    async fn test_start_missing_directory_fails() {
        let mut watcher = InputWatcher::new("/nonexistent/dir/doc.md");
        assert!(matches!(watcher.start(), Err(PageError::Io { .. })));
    }

    #[tokio::test]
    async fn test_start_without_file_name_fails() {
        let mut watcher = InputWatcher::new("/");
        assert!(watcher.start().is_err());
    }
}
