//! Placeholder resolution.

use super::PlaceholderTable;
use super::token;
use crate::escape::escape_html;

/// Opening and closing delimiter around one math span.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DelimiterPair {
    pub open: String,
    pub close: String,
}

impl DelimiterPair {
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Delimiters the downstream typesetting engine looks for.
///
/// Defaults to `$…$` for inline math and `$$…$$` for display math.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypesetDelimiters {
    pub inline: DelimiterPair,
    pub display: DelimiterPair,
}

impl Default for TypesetDelimiters {
    fn default() -> Self {
        Self {
            inline: DelimiterPair::new("$", "$"),
            display: DelimiterPair::new("$$", "$$"),
        }
    }
}

impl TypesetDelimiters {
    fn pair(&self, display: bool) -> &DelimiterPair {
        if display { &self.display } else { &self.inline }
    }
}

/// Replace every placeholder token in `html` with its math source.
///
/// The source is HTML-escaped and wrapped in the delimiter pair matching the
/// span's mode. Tokens whose index is missing from `table` are left as they
/// are. Substituted text is never scanned again.
///
/// # Examples
///
/// ```
/// use mdtex_renderer::math::{TypesetDelimiters, resolve, scan};
///
/// let scanned = scan("$a<b$");
/// let html = format!("<p>{}</p>", scanned.text);
/// assert_eq!(
///     resolve(&html, &scanned.table, &TypesetDelimiters::default()),
///     "<p>$a&lt;b$</p>"
/// );
/// ```
pub fn resolve(html: &str, table: &PlaceholderTable, delimiters: &TypesetDelimiters) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut cursor = 0;
    let mut resolved = 0usize;

    while let Some(found) = token::find_next(html, table.marker(), cursor) {
        out.push_str(&html[cursor..found.start]);

        match found.index.and_then(|index| table.get(index)) {
            Some(span) => {
                let pair = delimiters.pair(span.display);
                out.push_str(&pair.open);
                out.push_str(&escape_html(&span.source));
                out.push_str(&pair.close);
                resolved += 1;
            }
            None => {
                tracing::warn!(
                    token = &html[found.start..found.end],
                    "Placeholder without a math span, leaving it in place"
                );
                out.push_str(&html[found.start..found.end]);
            }
        }

        cursor = found.end;
    }

    out.push_str(&html[cursor..]);
    tracing::debug!(resolved, "Resolved math placeholders");
    out
}
