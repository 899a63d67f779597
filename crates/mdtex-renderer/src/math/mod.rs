//! Math span protection for markdown rendering.
//!
//! TeX and markdown disagree about `_`, `*`, `<` and `&`, so math cannot be
//! handed to the markdown parser as-is. Rendering is split in two phases:
//!
//! 1. **Scanning** ([`scan`]): math spans are cut out of the raw text and
//!    replaced by opaque placeholder tokens. The spans go into a
//!    [`PlaceholderTable`].
//!
//! 2. **Resolving** ([`resolve`]): after markdown rendering, every token in the
//!    HTML is swapped for the escaped math source wrapped in the delimiters the
//!    typesetting engine expects.
//!
//! # Example
//!
//! ```
//! use mdtex_renderer::math::{TypesetDelimiters, resolve, scan};
//!
//! let scanned = scan(r"Energy: $E = mc^2$ and \[a_1 < b_1\]");
//! assert_eq!(scanned.table.len(), 2);
//! assert!(!scanned.text.contains('$'));
//!
//! // Stand-in for the markdown pass: tokens come through untouched.
//! let html = format!("<p>{}</p>", scanned.text);
//! let resolved = resolve(&html, &scanned.table, &TypesetDelimiters::default());
//! assert_eq!(resolved, "<p>Energy: $E = mc^2$ and $$a_1 &lt; b_1$$</p>");
//! ```

mod resolver;
mod scanner;
mod token;

pub use resolver::{DelimiterPair, TypesetDelimiters, resolve};
pub use scanner::{ScanOptions, ScanResult, scan, scan_with};
pub(crate) use scanner::scan_avoiding;
pub(crate) use token::tokens_intact;

/// A math span cut out of the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MathSpan {
    /// Content between the delimiters, untouched.
    pub source: String,
    /// `true` for display (block) math, `false` for inline math.
    pub display: bool,
}

impl MathSpan {
    /// Create a display-mode span.
    #[must_use]
    pub fn display(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: true,
        }
    }

    /// Create an inline span.
    #[must_use]
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: false,
        }
    }
}

/// Math spans of one render call, indexed by placeholder number.
///
/// Index `i` is the span behind the `i`-th token emitted into the text. The
/// table also owns the token marker chosen for this render, so the resolver
/// only ever matches tokens produced by the same scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderTable {
    marker: String,
    spans: Vec<MathSpan>,
}

impl PlaceholderTable {
    pub(crate) fn new(marker: String) -> Self {
        Self {
            marker,
            spans: Vec::new(),
        }
    }

    /// Append a span and return the token that stands in for it.
    pub(crate) fn push(&mut self, span: MathSpan) -> String {
        let index = self.spans.len();
        let placeholder = token::encode(&self.marker, span.display, index);
        self.spans.push(span);
        placeholder
    }

    /// Marker embedded in every token of this table.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Span at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MathSpan> {
        self.spans.get(index)
    }

    /// All spans in emission order.
    #[must_use]
    pub fn spans(&self) -> &[MathSpan] {
        &self.spans
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Token that stands in for the span at `index`.
    ///
    /// Returns `None` when the index is out of range.
    #[must_use]
    pub fn placeholder(&self, index: usize) -> Option<String> {
        self.spans
            .get(index)
            .map(|span| token::encode(&self.marker, span.display, index))
    }
}
