//! Markdown rendering with placeholder-protected TeX math.
//!
//! Markdown and TeX both give meaning to `_`, `*`, `<` and `&`. Feeding math
//! straight to a markdown parser mangles it, so this crate renders in three
//! steps:
//!
//! 1. **Scan** ([`math::scan`]): cut `$$…$$`, `\[…\]`, `\(…\)` and `$…$` spans
//!    out of the text and leave opaque placeholder tokens behind.
//! 2. **Render** ([`StructuralRenderer`]): turn the placeholder-bearing
//!    markdown into HTML. [`CmarkRenderer`] does this with pulldown-cmark.
//! 3. **Resolve** ([`math::resolve`]): swap each token for the HTML-escaped
//!    math source wrapped in the delimiters a typesetting engine such as
//!    MathJax looks for.
//!
//! [`MathPipeline`] runs all three.
//!
//! # Example
//!
//! ```
//! use mdtex_renderer::MathPipeline;
//!
//! let result = MathPipeline::new()
//!     .render("Inline $a_1 < b_1$ and display:\n\n$$\\sum_i x_i$$")
//!     .unwrap();
//! assert_eq!(
//!     result.html,
//!     "<p>Inline $a_1 &lt; b_1$ and display:</p>\n<p>$$\\sum_i x_i$$</p>\n"
//! );
//! ```

mod escape;
mod fence;
mod html;
pub mod math;
mod pipeline;
mod structural;
mod util;

pub use escape::{escape_attr, escape_html};
pub use html::CmarkRenderer;
pub use pipeline::{MathPipeline, RenderResult};
pub use structural::{RenderError, RenderOptions, RendererInitError, StructuralRenderer};
