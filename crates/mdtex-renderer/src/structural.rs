//! Structural (markdown) renderer seam.
//!
//! The pipeline only needs "text in, HTML out". [`StructuralRenderer`] is that
//! contract; [`CmarkRenderer`](crate::CmarkRenderer) is the pulldown-cmark
//! implementation shipped with this crate.

/// Options passed to the structural renderer on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderOptions {
    /// Pass raw HTML through instead of escaping it.
    pub allow_raw_html: bool,
    /// Turn single newlines inside paragraphs into `<br />`.
    pub convert_single_newline_to_break: bool,
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists, alerts).
    pub gfm: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: true,
            convert_single_newline_to_break: false,
            gfm: true,
        }
    }
}

/// Converts placeholder-bearing markdown to HTML.
///
/// Implementations must return the placeholder tokens in the output
/// verbatim and must not have side effects besides the returned string.
pub trait StructuralRenderer: Send + Sync {
    /// Render `text` to HTML.
    fn render(&self, text: &str, options: &RenderOptions) -> Result<String, RenderError>;
}

impl<R: StructuralRenderer + ?Sized> StructuralRenderer for Box<R> {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<String, RenderError> {
        (**self).render(text, options)
    }
}

impl<R: StructuralRenderer + ?Sized> StructuralRenderer for std::sync::Arc<R> {
    fn render(&self, text: &str, options: &RenderOptions) -> Result<String, RenderError> {
        (**self).render(text, options)
    }
}

/// Error raised while rendering one document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The structural renderer rejected the input.
    #[error("Structural renderer failed: {0}")]
    Renderer(String),
}

/// Error raised when a structural renderer cannot be constructed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to initialize {renderer}: {message}")]
pub struct RendererInitError {
    /// Renderer name.
    pub renderer: String,
    /// Failure description.
    pub message: String,
}

impl RendererInitError {
    #[must_use]
    pub fn new(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl StructuralRenderer for Upper {
        fn render(&self, text: &str, _options: &RenderOptions) -> Result<String, RenderError> {
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!(options.allow_raw_html);
        assert!(!options.convert_single_newline_to_break);
        assert!(options.gfm);
    }

    #[test]
    fn test_boxed_renderer_delegates() {
        let renderer: Box<dyn StructuralRenderer> = Box::new(Upper);
        let html = renderer.render("abc", &RenderOptions::default()).unwrap();
        assert_eq!(html, "ABC");
    }

    #[test]
    fn test_init_error_message() {
        let err = RendererInitError::new("markdown", "missing grammar");
        assert_eq!(
            err.to_string(),
            "Failed to initialize markdown: missing grammar"
        );
    }
}
