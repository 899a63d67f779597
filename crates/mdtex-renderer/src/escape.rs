//! HTML escaping helpers.

use std::borrow::Cow;

/// Escape `&`, `<` and `>` so text can be embedded in HTML content.
///
/// No other characters are touched. Ampersands are rewritten in the same
/// left-to-right pass, so entities produced for `<` and `>` are never
/// escaped a second time.
///
/// # Examples
///
/// ```
/// use mdtex_renderer::escape_html;
///
/// assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
/// assert_eq!(escape_html(r#"x_1 "y""#), r#"x_1 "y""#);
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape text for use inside a double-quoted HTML attribute value.
///
/// Same as [`escape_html`] plus `"` → `&quot;`.
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    escape_with(text, true)
}

fn escape_with(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |b: u8| matches!(b, b'&' | b'<' | b'>') || (quotes && b == b'"');

    let Some(first) = text.bytes().position(needs_escape) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);
    for ch in text[first..].chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
