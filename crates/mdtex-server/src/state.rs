//! Application state.
//!
//! Shared state for all request handlers.

use mdtex_renderer::MathPipeline;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Markdown-with-math pipeline used by `/api/render`.
    pub(crate) pipeline: MathPipeline,
    /// MathJax loader URL handed to the editor page.
    pub(crate) mathjax_url: String,
    /// Whether the editor re-renders on every input change.
    pub(crate) live: bool,
}
