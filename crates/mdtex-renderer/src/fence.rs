//! Code fence tracking for math scanning.
//!
//! Splits input into fenced and unfenced regions so the scanner can leave
//! code blocks alone when asked to.

/// Tracks code fence state during line-by-line processing.
///
/// Code fences in `CommonMark` use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// A contiguous slice of the input, either inside a code fence or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub(crate) text: &'a str,
    pub(crate) fenced: bool,
}

/// Split `input` into alternating unfenced and fenced segments.
///
/// Fence marker lines belong to the fenced segment they open or close.
/// An unclosed fence extends to the end of the input. Concatenating the
/// segment texts yields `input` unchanged.
pub(crate) fn split_fenced(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut tracker = FenceTracker::new();
    let mut start = 0;
    let mut offset = 0;
    let mut current_fenced = false;

    for line in input.split_inclusive('\n') {
        let was_in_fence = tracker.in_fence();
        let is_marker = tracker.update(line.trim_end_matches(['\n', '\r']));
        let line_fenced = was_in_fence || is_marker;

        if line_fenced != current_fenced {
            if offset > start {
                segments.push(Segment {
                    text: &input[start..offset],
                    fenced: current_fenced,
                });
            }
            start = offset;
            current_fenced = line_fenced;
        }
        offset += line.len();
    }

    if offset > start {
        segments.push(Segment {
            text: &input[start..offset],
            fenced: current_fenced,
        });
    }

    segments
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Closing fences use the opening character, are at least as long, and
/// carry nothing but trailing whitespace.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    if count < min_len {
        return false;
    }

    trimmed[count * expected_char.len_utf8()..]
        .chars()
        .all(char::is_whitespace)
}
