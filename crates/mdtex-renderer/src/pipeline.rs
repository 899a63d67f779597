//! Scan → structural render → resolve.

use std::time::Instant;

use crate::html::CmarkRenderer;
use crate::math::{ScanOptions, TypesetDelimiters, resolve, scan_avoiding, tokens_intact};
use crate::structural::{RenderError, RenderOptions, StructuralRenderer};

/// Renders tried before resolving whatever tokens the last one produced.
const MAX_MARKER_ATTEMPTS: usize = 4;

/// Result of rendering one document.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RenderResult {
    /// Final HTML with math restored between typesetter delimiters.
    pub html: String,
    /// Number of math spans found in the input.
    pub math_count: usize,
}

/// Markdown-with-math renderer.
///
/// Each [`render`](Self::render) call scans the input for math, renders the
/// placeholder-bearing text with the structural renderer, then puts the math
/// back. No state is kept between calls, so one pipeline can serve
/// concurrent renders.
///
/// # Example
///
/// ```
/// use mdtex_renderer::MathPipeline;
///
/// let result = MathPipeline::new().render("*Euler*: $e^{i\\pi} + 1 = 0$").unwrap();
/// assert_eq!(result.html, "<p><em>Euler</em>: $e^{i\\pi} + 1 = 0$</p>\n");
/// assert_eq!(result.math_count, 1);
/// ```
pub struct MathPipeline<R = CmarkRenderer> {
    renderer: R,
    render_options: RenderOptions,
    scan_options: ScanOptions,
    delimiters: TypesetDelimiters,
}

impl MathPipeline<CmarkRenderer> {
    /// Create a pipeline backed by pulldown-cmark.
    #[must_use]
    pub fn new() -> Self {
        Self::with_renderer(CmarkRenderer::new())
    }
}

impl Default for MathPipeline<CmarkRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: StructuralRenderer> MathPipeline<R> {
    /// Create a pipeline around a custom structural renderer.
    #[must_use]
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            render_options: RenderOptions::default(),
            scan_options: ScanOptions::default(),
            delimiters: TypesetDelimiters::default(),
        }
    }

    /// Set structural renderer options.
    #[must_use]
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set scanner options.
    #[must_use]
    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    /// Set the delimiters written around restored math.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: TypesetDelimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    #[must_use]
    pub fn delimiters(&self) -> &TypesetDelimiters {
        &self.delimiters
    }

    #[must_use]
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Render `raw` to HTML.
    ///
    /// Nothing is returned when the structural renderer fails, so callers
    /// never see partially rendered output.
    ///
    /// If the rendered HTML spells out a token the scanner never emitted
    /// (character references decode to marker text), the input is scanned
    /// again with a marker absent from that HTML and rendered once more.
    pub fn render(&self, raw: &str) -> Result<RenderResult, RenderError> {
        let start = Instant::now();

        let mut avoid = String::new();
        let mut attempt = 1;
        let (scanned, html) = loop {
            let scanned = scan_avoiding(raw, &self.scan_options, &avoid);
            let html = self.renderer.render(&scanned.text, &self.render_options)?;
            if attempt == MAX_MARKER_ATTEMPTS
                || tokens_intact(&html, scanned.table.marker(), scanned.table.len())
            {
                break (scanned, html);
            }
            tracing::debug!(
                marker = scanned.table.marker(),
                attempt,
                "Rendered text collides with placeholder marker, rescanning"
            );
            avoid = html;
            attempt += 1;
        };
        let html = resolve(&html, &scanned.table, &self.delimiters);

        tracing::debug!(
            math = scanned.table.len(),
            bytes = html.len(),
            elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "Rendered document"
        );

        Ok(RenderResult {
            html,
            math_count: scanned.table.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::escape::escape_html;
    use crate::math::{DelimiterPair, scan};

    struct FailingRenderer;

    impl StructuralRenderer for FailingRenderer {
        fn render(&self, _text: &str, _options: &RenderOptions) -> Result<String, RenderError> {
            Err(RenderError::Renderer("boom".to_owned()))
        }
    }

    /// Remove everything between `<` and `>`.
    fn strip_tags(html: &str) -> String {
        let mut out = String::new();
        let mut in_tag = false;
        for ch in html.chars() {
            match ch {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => out.push(ch),
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_math_protected_from_emphasis() {
        let html = MathPipeline::new()
            .render("Let $a_1 * b_2 * c_3$ hold")
            .unwrap()
            .html;
        assert_eq!(html, "<p>Let $a_1 * b_2 * c_3$ hold</p>\n");
    }

    #[test]
    fn test_display_math_escaped() {
        let html = MathPipeline::new()
            .render("$$\n0 < x & y > 1\n$$")
            .unwrap()
            .html;
        assert_eq!(html, "<p>$$\n0 &lt; x &amp; y &gt; 1\n$$</p>\n");
    }

    #[test]
    fn test_each_form_appears_once_escaped() {
        let cases = [
            ("$$a<b$$", "$$a&lt;b$$"),
            (r"\[a<b\]", "$$a&lt;b$$"),
            (r"\(a<b\)", "$a&lt;b$"),
            ("$a<b$", "$a&lt;b$"),
        ];

        for (input, expected) in cases {
            let html = MathPipeline::new().render(input).unwrap().html;
            let text = strip_tags(&html);
            assert_eq!(text.matches(expected).count(), 1, "input: {input}");
            assert!(html.contains(&*escape_html("a<b")), "input: {input}");
        }
    }

    #[test]
    fn test_round_trip_preserves_math_payload() {
        let input = "# Results\n\n- first $x_1^2$\n- second \\(y_*\\)\n\n$$\\frac{a}{b} < c$$\n";
        let scanned = scan(input);
        let html = MathPipeline::new().render(input).unwrap().html;

        for span in scanned.table.spans() {
            assert!(
                html.contains(&*escape_html(&span.source)),
                "missing {:?} in {html}",
                span.source
            );
        }
        assert!(html.contains("<h1>Results</h1>"));
        assert!(html.contains("<li>first $x_1^2$</li>"));
        assert!(html.contains("<li>second $y_*$</li>"));
    }

    #[test]
    fn test_unclosed_dollar_passes_through() {
        let result = MathPipeline::new().render("costs $5 today").unwrap();
        assert_eq!(result.html, "<p>costs $5 today</p>\n");
        assert_eq!(result.math_count, 0);
    }

    #[test]
    fn test_user_text_resembling_token_untouched() {
        let result = MathPipeline::new()
            .render("@@MDTEXMATHI0@@ and $x$")
            .unwrap();
        assert_eq!(result.html, "<p>@@MDTEXMATHI0@@ and $x$</p>\n");
    }

    #[test]
    fn test_entity_spelled_token_stays_literal() {
        let result = MathPipeline::new()
            .render("literal @@&#77;DTEXMATHI0@@ then $x<y$")
            .unwrap();

        assert_eq!(
            result.html,
            "<p>literal @@MDTEXMATHI0@@ then $x&lt;y$</p>\n"
        );
        assert_eq!(result.math_count, 1);
    }

    #[test]
    fn test_math_inside_raw_html() {
        let html = MathPipeline::new()
            .render("<div>$a<b$</div>\n")
            .unwrap()
            .html;
        assert_eq!(html, "<div>$a&lt;b$</div>\n");
    }

    #[test]
    fn test_custom_delimiters() {
        let pipeline = MathPipeline::new().with_delimiters(TypesetDelimiters {
            inline: DelimiterPair::new(r"\(", r"\)"),
            display: DelimiterPair::new(r"\[", r"\]"),
        });
        let html = pipeline.render("$x$ and $$y$$").unwrap().html;
        assert_eq!(html, "<p>\\(x\\) and \\[y\\]</p>\n");
    }

    #[test]
    fn test_renderer_failure_propagates() {
        let result = MathPipeline::with_renderer(FailingRenderer).render("$x$");
        assert!(matches!(result, Err(RenderError::Renderer(_))));
    }

    #[test]
    fn test_skip_code_fences_option() {
        let pipeline = MathPipeline::new().with_scan_options(ScanOptions {
            skip_code_fences: true,
        });
        let result = pipeline.render("```\ncost: $5 and $6\n```\n").unwrap();
        assert_eq!(result.math_count, 0);
        assert_eq!(
            result.html,
            "<pre><code>cost: $5 and $6\n</code></pre>\n"
        );
    }
}
