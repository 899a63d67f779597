//! Error types for the page model.

use std::path::PathBuf;

/// Error raised by page I/O.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Reading the input or mirroring the output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file watcher could not be created.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Error raised by a typesetting engine.
///
/// Typeset failures never reach the user as errors: the trigger logs them
/// and the output stays visible as escaped TeX.
#[derive(Debug, thiserror::Error)]
pub enum TypesetError {
    /// The engine process could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The engine process exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Status { program: String, status: String },
    /// Any other engine failure.
    #[error("Typeset failed: {0}")]
    Engine(String),
}
