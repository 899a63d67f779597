//! Delimiter scanner.
//!
//! Four passes run in fixed order, each over the output of the previous one:
//!
//! | Pass | Delimiters  | Mode    | Body                                 |
//! |------|-------------|---------|--------------------------------------|
//! | 1    | `$$ … $$`   | display | anything, may be empty               |
//! | 2    | `\[ … \]`   | display | anything, may be empty               |
//! | 3    | `\( … \)`   | inline  | anything, may be empty               |
//! | 4    | `$ … $`     | inline  | non-empty, no `$` first, no newline  |
//!
//! All bodies use the shortest match. Tokens inserted by earlier passes
//! contain no delimiter characters, so later passes never see inside them.
//! Every pass is one forward walk over its input.

use super::token::choose_marker;
use super::{MathSpan, PlaceholderTable};
use crate::fence::split_fenced;

/// Scanner options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Leave fenced code blocks (```` ``` ```` / `~~~`) unscanned.
    pub skip_code_fences: bool,
}

/// Output of [`scan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    /// Input text with every math span replaced by a placeholder token.
    pub text: String,
    /// Extracted spans, indexed by token number.
    pub table: PlaceholderTable,
}

/// Extract math spans from `input` with default options.
///
/// # Examples
///
/// ```
/// use mdtex_renderer::math::{MathSpan, scan};
///
/// let result = scan("$$a$b$$");
/// assert_eq!(result.table.spans(), &[MathSpan::display("a$b")]);
///
/// let result = scan("$unclosed");
/// assert!(result.table.is_empty());
/// assert_eq!(result.text, "$unclosed");
/// ```
pub fn scan(input: &str) -> ScanResult {
    scan_with(input, &ScanOptions::default())
}

/// Extract math spans from `input`.
pub fn scan_with(input: &str, options: &ScanOptions) -> ScanResult {
    scan_avoiding(input, options, "")
}

/// Like [`scan_with`], with a marker that also does not occur in `avoid`.
pub(crate) fn scan_avoiding(input: &str, options: &ScanOptions, avoid: &str) -> ScanResult {
    let mut table = PlaceholderTable::new(choose_marker(&[input, avoid]));

    let mut segments: Vec<(String, bool)> = if options.skip_code_fences {
        split_fenced(input)
            .into_iter()
            .map(|segment| (segment.text.to_owned(), segment.fenced))
            .collect()
    } else {
        vec![(input.to_owned(), false)]
    };

    for pass in PASSES {
        for (text, fenced) in &mut segments {
            if !*fenced {
                *text = pass.apply(text, &mut table);
            }
        }
    }

    let text: String = segments.into_iter().map(|(text, _)| text).collect();
    tracing::debug!(spans = table.len(), "Scanned math spans");

    ScanResult { text, table }
}

/// One delimiter class.
#[derive(Clone, Copy, Debug)]
enum Pass {
    /// Paired open/close strings; bodies may span lines and be empty.
    Paired {
        open: &'static str,
        close: &'static str,
        display: bool,
    },
    /// Single-dollar inline math.
    InlineDollar,
}

const PASSES: [Pass; 4] = [
    Pass::Paired {
        open: "$$",
        close: "$$",
        display: true,
    },
    Pass::Paired {
        open: r"\[",
        close: r"\]",
        display: true,
    },
    Pass::Paired {
        open: r"\(",
        close: r"\)",
        display: false,
    },
    Pass::InlineDollar,
];

impl Pass {
    fn apply(self, text: &str, table: &mut PlaceholderTable) -> String {
        match self {
            Self::Paired {
                open,
                close,
                display,
            } => replace_paired(text, open, close, display, table),
            Self::InlineDollar => replace_inline_dollar(text, table),
        }
    }
}

/// Replace every `open … close` span, shortest match first.
///
/// The first opener without a closer ends the pass: any later opener would
/// need a closer after it, which this one would have used first.
fn replace_paired(
    text: &str,
    open: &str,
    close: &str,
    display: bool,
    table: &mut PlaceholderTable,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        let body_start = start + open.len();
        let Some(body_len) = rest[body_start..].find(close) else {
            break;
        };
        let body_end = body_start + body_len;

        out.push_str(&rest[..start]);
        out.push_str(&table.push(MathSpan {
            source: rest[body_start..body_end].to_owned(),
            display,
        }));
        rest = &rest[body_end + close.len()..];
    }

    out.push_str(rest);
    out
}

/// Replace `$…$` spans whose body is non-empty, does not start with `$`
/// and does not cross a newline.
fn replace_inline_dollar(text: &str, table: &mut PlaceholderTable) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('$') {
        let after = &rest[start + 1..];

        if after.starts_with('$') {
            // `$$` cannot open inline math; retry from the second dollar.
            out.push_str(&rest[..=start]);
            rest = after;
            continue;
        }

        match after.find(['$', '\n']) {
            Some(end) if after.as_bytes()[end] == b'$' => {
                out.push_str(&rest[..start]);
                out.push_str(&table.push(MathSpan::inline(&after[..end])));
                rest = &after[end + 1..];
            }
            Some(end) => {
                // Newline before the closer: no `$` can open before it either.
                out.push_str(&rest[..start + 1 + end]);
                rest = &after[end..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}
