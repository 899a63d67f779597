//! Placeholder token encoding.
//!
//! A token looks like `@@MDTEXMATHB12@@`: the marker, a kind letter (`B` for
//! block, `I` for inline), the table index, and a closing `@@` that ends the
//! index. The marker is lengthened until it does not occur in the input, so
//! tokens never collide with user text. Rendering can still spell a marker
//! out of entities such as `&#77;`; [`tokens_intact`] detects that case.

const BASE_MARKER: &str = "MDTEXMATH";
const FENCE: &str = "@@";
const BLOCK: u8 = b'B';
const INLINE: u8 = b'I';

/// Pick a marker that does not occur in any of `texts`.
pub(crate) fn choose_marker(texts: &[&str]) -> String {
    let mut marker = BASE_MARKER.to_owned();
    while texts.iter().any(|text| text.contains(marker.as_str())) {
        marker.push('X');
    }
    marker
}

/// Whether every token in `html` names a distinct span below `len`.
///
/// False when rendered text spells out a token the scanner never emitted.
pub(crate) fn tokens_intact(html: &str, marker: &str, len: usize) -> bool {
    let mut seen = vec![false; len];
    let mut cursor = 0;

    while let Some(found) = find_next(html, marker, cursor) {
        match found.index.and_then(|index| seen.get_mut(index)) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
        cursor = found.end;
    }

    true
}

pub(crate) fn encode(marker: &str, display: bool, index: usize) -> String {
    let kind = if display { 'B' } else { 'I' };
    format!("{FENCE}{marker}{kind}{index}{FENCE}")
}

/// A token found in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Found {
    /// Byte offset of the token start.
    pub(crate) start: usize,
    /// Byte offset just past the token.
    pub(crate) end: usize,
    /// Parsed index, `None` when the digits overflow `usize`.
    pub(crate) index: Option<usize>,
}

/// Find the next well-formed token at or after `from`.
pub(crate) fn find_next(haystack: &str, marker: &str, from: usize) -> Option<Found> {
    let prefix_len = FENCE.len() + marker.len();
    let mut cursor = from;

    while let Some(rel) = haystack[cursor..].find(FENCE) {
        let start = cursor + rel;
        let bytes = haystack.as_bytes();

        if haystack[start + FENCE.len()..].starts_with(marker)
            && let Some(found) = parse_tail(bytes, start, start + prefix_len)
        {
            return Some(found);
        }
        cursor = start + 1;
    }

    None
}

/// Parse `{kind}{digits}@@` starting at `pos`.
fn parse_tail(bytes: &[u8], start: usize, pos: usize) -> Option<Found> {
    let kind = *bytes.get(pos)?;
    if kind != BLOCK && kind != INLINE {
        return None;
    }

    let digits_start = pos + 1;
    let digits_len = bytes[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }

    let digits_end = digits_start + digits_len;
    if !bytes[digits_end..].starts_with(FENCE.as_bytes()) {
        return None;
    }

    // Digits are ASCII, so the slice is valid UTF-8.
    let index = std::str::from_utf8(&bytes[digits_start..digits_end])
        .ok()
        .and_then(|digits| digits.parse().ok());

    Some(Found {
        start,
        end: digits_end + FENCE.len(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_marker_default() {
        assert_eq!(choose_marker(&["plain $x$"]), "MDTEXMATH");
    }

    #[test]
    fn test_choose_marker_avoids_input() {
        assert_eq!(choose_marker(&["MDTEXMATH"]), "MDTEXMATHX");
        assert_eq!(choose_marker(&["MDTEXMATH MDTEXMATHX"]), "MDTEXMATHXX");
        assert_eq!(choose_marker(&["plain", "MDTEXMATH"]), "MDTEXMATHX");
    }

    #[test]
    fn test_tokens_intact() {
        assert!(tokens_intact("<p>@@MI0@@ @@MB1@@</p>", "M", 2));
        assert!(tokens_intact("<p>none</p>", "M", 0));
        // Same index twice, unknown index, overflowing index
        assert!(!tokens_intact("@@MI0@@ @@MI0@@", "M", 1));
        assert!(!tokens_intact("@@MI0@@ @@MI3@@", "M", 1));
        assert!(!tokens_intact("@@MI99999999999999999999999@@", "M", 1));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("M", true, 3), "@@MB3@@");
        assert_eq!(encode("M", false, 10), "@@MI10@@");
    }

    #[test]
    fn test_find_next_parses_index() {
        let found = find_next("<p>@@MI12@@</p>", "M", 0).unwrap();
        assert_eq!(found.start, 3);
        assert_eq!(found.end, 11);
        assert_eq!(found.index, Some(12));
    }

    #[test]
    fn test_find_next_skips_leading_at_signs() {
        let found = find_next("@@@MB0@@", "M", 0).unwrap();
        assert_eq!(found.start, 1);
        assert_eq!(found.index, Some(0));
    }

    #[test]
    fn test_find_next_rejects_malformed() {
        assert_eq!(find_next("@@MB@@", "M", 0), None);
        assert_eq!(find_next("@@MX1@@", "M", 0), None);
        assert_eq!(find_next("@@MB1@", "M", 0), None);
        assert_eq!(find_next("@@NB1@@", "M", 0), None);
    }

    #[test]
    fn test_find_next_overflowing_index() {
        let found = find_next("@@MI99999999999999999999999@@", "M", 0).unwrap();
        assert_eq!(found.index, None);
    }
}
