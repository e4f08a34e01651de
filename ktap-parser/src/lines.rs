// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single-pass view over numbered lines with one line of lookahead.

use debug_ignore::DebugIgnore;

/// A stream of lines with a `peek`/`pop` interface.
///
/// The underlying iterator yields `(line_number, text)` pairs. It is pulled from lazily, one line
/// ahead of the consumer. If it is backed by a blocking reader (e.g. a pipe from a running
/// kernel), blocking only happens inside [`new`](Self::new) and [`pop`](Self::pop).
#[derive(Debug)]
pub struct LineStream<'a> {
    lines: DebugIgnore<Box<dyn Iterator<Item = (usize, String)> + 'a>>,
    next: Option<(usize, String)>,
}

impl<'a> LineStream<'a> {
    /// Creates a new stream over `(line_number, text)` pairs.
    pub fn new<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (usize, String)>,
        I::IntoIter: 'a,
    {
        let mut lines: Box<dyn Iterator<Item = (usize, String)> + 'a> = Box::new(lines.into_iter());
        let next = lines.next();
        Self {
            lines: DebugIgnore(lines),
            next,
        }
    }

    /// Creates a new stream over the given lines, numbering them starting from 1.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        I::IntoIter: 'a,
    {
        Self::new(
            lines
                .into_iter()
                .enumerate()
                .map(|(idx, line)| (idx + 1, line.into())),
        )
    }

    /// Returns the next line without consuming it, or `None` if the stream is exhausted.
    pub fn peek(&self) -> Option<&str> {
        self.next.as_ref().map(|(_, line)| line.as_str())
    }

    /// Consumes and returns the next line, or `None` if the stream is exhausted.
    pub fn pop(&mut self) -> Option<String> {
        let upcoming = self.lines.next();
        std::mem::replace(&mut self.next, upcoming).map(|(_, line)| line)
    }

    /// Returns true if there are lines left in the stream.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns the 1-based source line number of the upcoming line, or 0 if the stream is
    /// exhausted.
    pub fn line_number(&self) -> usize {
        self.next.as_ref().map_or(0, |(line_number, _)| *line_number)
    }
}

impl Iterator for LineStream<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}
