//! Event debouncing for watch mode.
//!
//! Editors often emit several events per save (truncate, write, rename).
//! These are coalesced into one event per path once the path has been quiet
//! for the debounce duration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A debounced filesystem event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct PendingEvent {
    kind: FsEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, PendingEvent>>,
    debounce: Duration,
}

impl EventDebouncer {
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            debounce,
        }
    }

    /// Record an event, pushing the path's deadline back.
    ///
    /// Safe to call from the notify callback thread.
    pub(crate) fn record(&self, path: PathBuf, kind: FsEventKind) {
        use std::collections::hash_map::Entry;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.debounce;

        match pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent { kind, deadline });
            }
            Entry::Occupied(mut entry) => {
                if let Some(kind) = Self::coalesce(entry.get().kind, kind) {
                    let event = entry.get_mut();
                    event.kind = kind;
                    event.deadline = deadline;
                } else {
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two event kinds. `None` drops the path entirely.
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: FsEventKind, new: FsEventKind) -> Option<FsEventKind> {
        use FsEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (Created, Created | Modified) => Some(Created),
            // Appeared and vanished within one window
            (Created, Removed) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),

            // Write-temp-then-rename saves look like this
            (Removed, Created) => Some(Modified),
            (Removed, Modified | Removed) => Some(Removed),
        }
    }

    /// Remove and return events whose deadline has passed.
    pub(crate) fn drain_ready(&self) -> Vec<FsEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let mut ready = Vec::new();
        pending.retain(|path, event| {
            if event.deadline <= now {
                ready.push(FsEvent {
                    path: path.clone(),
                    kind: event.kind,
                });
                false
            } else {
                true
            }
        });
        ready
    }
}
