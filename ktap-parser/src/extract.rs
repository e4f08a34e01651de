// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Isolates KTAP output from the rest of the kernel console log.
//!
//! Kernel console output contains a lot more than test results: boot messages, timestamps added
//! by the console transport, and shutdown noise. The KTAP region starts at the first
//! `KTAP version N` or `TAP version N` line. Whatever precedes the header on that line (typically a
//! `[    0.123456] ` timestamp) is assumed to be added to every following line as well, and is
//! stripped.

use crate::{
    config::ParserConfig, helpers::strip_prefix_chars, lines::LineStream, write_str::WriteStr,
};
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::{io, sync::LazyLock};
use tracing::{debug, warn};

// Unlike the classifiers, these are searched for anywhere in the line.
static KTAP_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"KTAP version ([0-9]+)$").unwrap());
static TAP_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"TAP version ([0-9]+)$").unwrap());

/// Returns a [`LineStream`] over the KTAP lines within `kernel_output`.
///
/// The stream is empty if no version header is found. Line numbers in the stream refer to
/// positions in `kernel_output`, starting from 1.
pub fn extract_tap_lines<'a, I>(kernel_output: I, config: &ParserConfig) -> LineStream<'a>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    I::IntoIter: 'a,
{
    let end_markers = match AhoCorasick::new(&config.end_markers) {
        Ok(matcher) => Some(matcher),
        Err(error) => {
            warn!("ignoring end markers, failed to build matcher: {error}");
            None
        }
    };

    LineStream::new(IsolateKtapOutput {
        lines: kernel_output.into_iter(),
        line_num: 0,
        state: IsolateState::Searching,
        end_markers,
    })
}

#[derive(Copy, Clone, Debug)]
enum IsolateState {
    Searching,
    /// `prefix_chars` is the number of characters before the version header.
    Started { prefix_chars: usize },
    Done,
}

struct IsolateKtapOutput<I> {
    lines: I,
    line_num: usize,
    state: IsolateState,
    end_markers: Option<AhoCorasick>,
}

impl<I> IsolateKtapOutput<I> {
    fn is_end_marker(&self, line: &str) -> bool {
        self.end_markers
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(line))
    }
}

impl<I> Iterator for IsolateKtapOutput<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = (usize, String);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let IsolateState::Done = self.state {
                return None;
            }

            let Some(line) = self.lines.next() else {
                self.state = IsolateState::Done;
                return None;
            };
            self.line_num += 1;
            let line = line.as_ref().trim_end();

            match self.state {
                IsolateState::Searching => {
                    let marker = if KTAP_START.is_match(line) {
                        "KTAP version"
                    } else if TAP_START.is_match(line) {
                        "TAP version"
                    } else {
                        continue;
                    };
                    // The regex matched, so the marker is present.
                    let start = line.find(marker).unwrap_or_default();
                    let prefix_chars = line[..start].chars().count();
                    debug!(
                        line_num = self.line_num,
                        prefix_chars, "found start of KTAP output"
                    );
                    self.state = IsolateState::Started { prefix_chars };
                    return Some((self.line_num, line[start..].to_owned()));
                }
                IsolateState::Started { prefix_chars } => {
                    if self.is_end_marker(line) {
                        debug!(line_num = self.line_num, "found end of KTAP output");
                        self.state = IsolateState::Done;
                        return None;
                    }
                    // Remove the prefix and any indentation.
                    let line = strip_prefix_chars(line, prefix_chars).trim_start();
                    return Some((self.line_num, line.to_owned()));
                }
                IsolateState::Done => return None,
            }
        }
    }
}

/// Writes out all of the given kernel output unchanged, apart from trailing whitespace.
pub fn write_raw_output<I>(kernel_output: I, writer: &mut dyn WriteStr) -> io::Result<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for line in kernel_output {
        writeln!(writer, "{}", line.as_ref().trim_end())?;
    }
    writer.write_str_flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn extract(input: &str) -> Vec<(usize, String)> {
        let config = ParserConfig::default();
        let mut lines = extract_tap_lines(input.lines(), &config);
        let mut out = Vec::new();
        while lines.has_next() {
            let line_number = lines.line_number();
            out.push((line_number, lines.pop().expect("has_next was true")));
        }
        out
    }

    #[test]
    fn test_strips_timestamp_prefix() {
        let input = indoc! {"
            [    0.060000] printk: console [mc-1] enabled
            [    0.060000] random: crng init done
            [    0.070000] KTAP version 1
            [    0.070000] 1..1
            [    0.070000]     # Subtest: example
            [    0.070000]     1..1
            [    0.070000]     ok 1 - example_simple_test
            [    0.070000] ok 1 - example
            [    0.080000] List of all partitions:
            [    0.080000] not ok 2 - should not be parsed
        "};

        assert_eq!(
            extract(input),
            vec![
                (3, "KTAP version 1".to_owned()),
                (4, "1..1".to_owned()),
                (5, "# Subtest: example".to_owned()),
                (6, "1..1".to_owned()),
                (7, "ok 1 - example_simple_test".to_owned()),
                (8, "ok 1 - example".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tap_header() {
        let input = indoc! {"
            boot noise
            TAP version 14
            1..1
            ok 1 - test
        "};

        assert_eq!(
            extract(input),
            vec![
                (2, "TAP version 14".to_owned()),
                (3, "1..1".to_owned()),
                (4, "ok 1 - test".to_owned()),
            ]
        );
    }

    #[test]
    fn test_no_header() {
        let input = indoc! {"
            printk: console [mc-1] enabled
            1..1
            ok 1 - test
        "};
        assert!(extract(input).is_empty());
    }

    #[test]
    fn test_header_must_end_line() {
        assert!(extract("KTAP version 1 and more\nok 1 - test").is_empty());
    }

    #[test]
    fn test_trailing_whitespace_and_short_lines() {
        let input = "<6>KTAP version 1  \r\n<6>1..2\n\nx\n<6>ok 1 - a\n";
        assert_eq!(
            extract(input),
            vec![
                (1, "KTAP version 1".to_owned()),
                (2, "1..2".to_owned()),
                // Lines shorter than the prefix become empty.
                (3, "".to_owned()),
                (4, "".to_owned()),
                (5, "ok 1 - a".to_owned()),
            ]
        );
    }

    #[test]
    fn test_prefix_counted_in_chars() {
        // The prefix is 3 characters but 4 bytes.
        let input = "é: KTAP version 1\nab:1..1\nabé1..1\n";
        assert_eq!(
            extract(input),
            vec![
                (1, "KTAP version 1".to_owned()),
                (2, "1..1".to_owned()),
                (3, "1..1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_custom_end_marker() {
        let config = ParserConfig {
            end_markers: vec!["ktap-done".to_owned()],
            ..ParserConfig::default()
        };
        let input = ["KTAP version 1", "1..1", "ok 1 a", "ktap-done", "ok 2 b"];
        let lines: Vec<_> = extract_tap_lines(input, &config).collect();
        assert_eq!(lines, ["KTAP version 1", "1..1", "ok 1 a"]);
    }

    #[test]
    fn test_write_raw_output() {
        let mut out = String::new();
        write_raw_output(["[ 0.1] boot  ", "KTAP version 1", ""], &mut out)
            .expect("writing to a string succeeds");
        assert_eq!(out, "[ 0.1] boot\nKTAP version 1\n\n");
    }
}
