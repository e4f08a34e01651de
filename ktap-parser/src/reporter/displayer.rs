// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prints a human-readable report as tests are parsed.

use super::{
    events::{EventSink, ParseEvent},
    formatters::{DisplayDivider, DisplayTimestamp},
    helpers::Styles,
};
use crate::{
    config::ReporterConfig,
    errors::{TestParseError, WriteEventError},
    helpers::text_width,
    test::{Test, TestStatus},
    write_str::WriteStr,
};
use chrono::Local;
use owo_colors::OwoColorize;
use std::io;
use swrite::{SWrite, swrite};

/// Builder for a [`DisplayReporter`].
#[derive(Clone, Debug)]
pub struct DisplayReporterBuilder {
    should_colorize: bool,
    timestamps: bool,
    divider_width: usize,
}

impl DisplayReporterBuilder {
    /// Creates a new builder with colors disabled and timestamps enabled.
    pub fn new() -> Self {
        Self::from_config(&ReporterConfig::default())
    }

    /// Creates a new builder from the `[reporter]` section of the config.
    pub fn from_config(config: &ReporterConfig) -> Self {
        Self {
            should_colorize: false,
            timestamps: config.timestamps,
            divider_width: config.divider_width,
        }
    }

    /// Sets whether output should be colorized.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets whether each line should be prefixed with a `[HH:MM:SS]` timestamp.
    pub fn set_timestamps(&mut self, timestamps: bool) -> &mut Self {
        self.timestamps = timestamps;
        self
    }

    /// Sets the width of `=====` dividers.
    pub fn set_divider_width(&mut self, divider_width: usize) -> &mut Self {
        self.divider_width = divider_width;
        self
    }

    /// Creates a new reporter writing to `writer`.
    pub fn build<W: WriteStr>(&self, writer: W) -> DisplayReporter<W> {
        let mut styles = Styles::default();
        if self.should_colorize {
            styles.colorize();
        }

        DisplayReporter {
            writer,
            styles,
            timestamps: self.timestamps,
            divider_width: self.divider_width,
        }
    }
}

impl Default for DisplayReporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints a header when a suite starts, a result line for each test case, a footer when a suite
/// finishes and a summary line at the end.
///
/// Output is flushed after every event.
#[derive(Debug)]
pub struct DisplayReporter<W> {
    writer: W,
    styles: Styles,
    timestamps: bool,
    divider_width: usize,
}

impl<W: WriteStr> DisplayReporter<W> {
    /// Returns the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write_event_impl(&mut self, event: ParseEvent<'_>) -> io::Result<()> {
        match event {
            ParseEvent::RunStarted => {
                let divider = "=".repeat(self.divider_width);
                self.write_line(&divider)?;
            }
            ParseEvent::SuiteStarted { test } => {
                let mut message = test.name.clone();
                if let Some(count) = test.expected_count.filter(|&count| count > 0) {
                    swrite!(message, " ({count} subtests)");
                }
                let divider = self.divider(&message, text_width(&message));
                self.write_line(&divider)?;
            }
            ParseEvent::CaseFinished { test } => {
                let (result, _) = self.format_result(test)?;
                self.write_line(&result)?;
            }
            ParseEvent::SuiteFinished { test } => {
                let (result, width) = self.format_result(test)?;
                let divider = self.divider(&result, width);
                self.write_line(&divider)?;
            }
            ParseEvent::ErrorRecorded {
                test_name, error, ..
            } => {
                let line = self.format_error(test_name, error);
                self.write_line(&line)?;
            }
            ParseEvent::RunFinished { test } => {
                let divider = "=".repeat(self.divider_width);
                self.write_line(&divider)?;
                let style = match test.status {
                    TestStatus::Success | TestStatus::NoTests => self.styles.pass,
                    TestStatus::Skipped => self.styles.skip,
                    TestStatus::Failure | TestStatus::Crashed | TestStatus::FailureToParse => {
                        self.styles.fail
                    }
                };
                let summary = format!("Testing complete. {}", test.counts);
                self.write_line(&summary.style(style).to_string())?;
            }
        }

        self.writer.write_str_flush()
    }

    /// Formats `[STATUS] name`, printing the test's log first if it didn't pass or get skipped.
    ///
    /// Returns the formatted text and its width on a terminal.
    fn format_result(&mut self, test: &Test) -> io::Result<(String, usize)> {
        let (tag, style) = match test.status {
            TestStatus::Success => ("[PASSED] ", self.styles.pass),
            TestStatus::Skipped => ("[SKIPPED] ", self.styles.skip),
            TestStatus::Crashed => ("[CRASHED] ", self.styles.fail),
            TestStatus::Failure | TestStatus::NoTests | TestStatus::FailureToParse => {
                ("[FAILED] ", self.styles.fail)
            }
        };
        if !matches!(test.status, TestStatus::Success | TestStatus::Skipped) {
            self.write_log(&test.log)?;
        }

        let mut out = String::new();
        swrite!(out, "{}{}", tag.style(style), test.name);
        Ok((out, text_width(tag) + text_width(&test.name)))
    }

    fn format_error(&self, test_name: &str, error: &TestParseError) -> String {
        let mut out = String::new();
        swrite!(
            out,
            "{}Test {test_name}: {error}",
            "[ERROR] ".style(self.styles.fail)
        );
        out
    }

    fn write_log(&mut self, log: &[String]) -> io::Result<()> {
        for line in log {
            let line = line.style(self.styles.log).to_string();
            self.write_line(&line)?;
        }
        self.write_line("")
    }

    fn divider(&self, message: &str, message_width: usize) -> String {
        DisplayDivider {
            message,
            message_width,
            width: self.divider_width,
        }
        .to_string()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.timestamps {
            write!(self.writer, "{}", DisplayTimestamp(Local::now()))?;
        }
        writeln!(self.writer, "{line}")
    }
}

impl<W: WriteStr> EventSink for DisplayReporter<W> {
    fn report_event(&mut self, event: ParseEvent<'_>) -> Result<(), WriteEventError> {
        self.write_event_impl(event).map_err(WriteEventError::Io)
    }
}
