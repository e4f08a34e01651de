// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for ktap-parser.

use unicode_width::UnicodeWidthChar;

/// Removes the first `count` characters of `line`.
///
/// Lines shorter than `count` become empty.
pub(crate) fn strip_prefix_chars(line: &str, count: usize) -> &str {
    line.char_indices()
        .nth(count)
        .map_or("", |(start, _)| &line[start..])
}

/// Returns the number of terminal columns `text` occupies.
///
/// This is the sum of the widths of the individual characters, which is close enough for test
/// names.
pub(crate) fn text_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}
