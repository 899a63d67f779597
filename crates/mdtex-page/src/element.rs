//! Shared input and output slots.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::PageError;

/// Shared markdown source, read at render time.
///
/// Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct InputBuffer {
    text: Arc<RwLock<String>>,
}

impl InputBuffer {
    /// Create a buffer holding `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(text.into())),
        }
    }

    /// Current contents.
    #[must_use]
    pub fn text(&self) -> String {
        self.text
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the contents.
    pub fn set(&self, text: impl Into<String>) {
        *self.text.write().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    /// Replace the contents with the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Io`] if the file cannot be read. The buffer is
    /// left unchanged in that case.
    pub fn load(&self, path: &Path) -> Result<(), PageError> {
        let text = std::fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.set(text);
        Ok(())
    }
}

/// Shared HTML slot fully replaced on every render.
///
/// When created with [`mirrored_to`](Self::mirrored_to), every replacement is
/// also written to a file so external tools can pick it up.
#[derive(Clone, Debug, Default)]
pub struct HtmlContainer {
    html: Arc<RwLock<String>>,
    mirror: Option<Arc<PathBuf>>,
}

impl HtmlContainer {
    /// Create an empty in-memory container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container mirrored to `path`.
    #[must_use]
    pub fn mirrored_to(path: impl Into<PathBuf>) -> Self {
        Self {
            html: Arc::default(),
            mirror: Some(Arc::new(path.into())),
        }
    }

    /// Current HTML.
    #[must_use]
    pub fn html(&self) -> String {
        self.html
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mirror file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.mirror.as_deref().map(PathBuf::as_path)
    }

    /// Replace the HTML.
    ///
    /// The in-memory value is always replaced; the mirror file is written
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Io`] if the mirror file cannot be written.
    pub fn replace(&self, html: impl Into<String>) -> Result<(), PageError> {
        let html = html.into();
        if let Some(path) = &self.mirror {
            let result = std::fs::write(path.as_path(), &html);
            *self.html.write().unwrap_or_else(PoisonError::into_inner) = html;
            return result.map_err(|source| PageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        *self.html.write().unwrap_or_else(PoisonError::into_inner) = html;
        Ok(())
    }

    /// Re-read the mirror file into memory.
    ///
    /// Used after an external engine rewrote the file in place. Containers
    /// without a mirror are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Io`] if the mirror file cannot be read.
    pub fn reload(&self) -> Result<(), PageError> {
        let Some(path) = &self.mirror else {
            return Ok(());
        };
        let html = std::fs::read_to_string(path.as_path()).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        *self.html.write().unwrap_or_else(PoisonError::into_inner) = html;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_input_buffer_shared_between_clones() {
        let buffer = InputBuffer::new("a");
        let clone = buffer.clone();

        clone.set("b");

        assert_eq!(buffer.text(), "b");
    }

    #[test]
    fn test_input_buffer_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n").unwrap();

        let buffer = InputBuffer::default();
        buffer.load(&path).unwrap();

        assert_eq!(buffer.text(), "# Title\n");
    }

    #[test]
    fn test_input_buffer_load_missing_keeps_text() {
        let buffer = InputBuffer::new("keep");
        let err = buffer.load(Path::new("/nonexistent/doc.md")).unwrap_err();

        assert!(matches!(err, PageError::Io { .. }));
        assert_eq!(buffer.text(), "keep");
    }

    #[test]
    fn test_container_replace_in_memory() {
        let container = HtmlContainer::new();
        container.replace("<p>one</p>").unwrap();
        container.replace("<p>two</p>").unwrap();

        assert_eq!(container.html(), "<p>two</p>");
        assert!(container.path().is_none());
    }

    #[test]
    fn test_container_mirrors_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let container = HtmlContainer::mirrored_to(&path);

        container.replace("<p>x</p>").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>x</p>");
        assert_eq!(container.path(), Some(path.as_path()));
    }

    #[test]
    fn test_container_reload_from_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        let container = HtmlContainer::mirrored_to(&path);
        container.replace("<p>$x$</p>").unwrap();

        std::fs::write(&path, "<p><mjx-container></mjx-container></p>").unwrap();
        container.reload().unwrap();

        assert_eq!(container.html(), "<p><mjx-container></mjx-container></p>");
    }

    #[test]
    fn test_container_mirror_failure_reported() {
        let container = HtmlContainer::mirrored_to("/nonexistent/dir/out.html");
        let err = container.replace("<p>x</p>").unwrap_err();

        assert!(matches!(err, PageError::Io { .. }));
        assert_eq!(container.html(), "<p>x</p>");
    }
}
