// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recursive KTAP parser.
//!
//! A KTAP document is a tree. Each node is one of:
//!
//! * the top-level test, introduced by a `KTAP version N` or `TAP version N` header and a plan
//!   line;
//! * a suite, introduced by a `# Subtest: name` header and a plan line, and closed by a result
//!   line with the same name;
//! * a test case, which is just a result line.
//!
//! Any node may be preceded by diagnostic lines, which are attached to its log. The parser is
//! lenient: problems with the input are recorded as [`TestParseError`]s on the node where they were
//! found, and parsing always continues.

use crate::{
    classify,
    config::ParserConfig,
    errors::{TestParseError, WriteEventError},
    extract::extract_tap_lines,
    lines::LineStream,
    reporter::{EventSink, ParseEvent},
    test::{Test, TestStatus},
};
use tracing::{debug, trace};

/// Parses all test results within `kernel_output`, reporting progress to `sink`.
///
/// This is a convenience wrapper around [`KtapParser::parse_run_tests`].
pub fn parse_run_tests<'a, I, S>(
    kernel_output: I,
    config: &ParserConfig,
    sink: S,
) -> Result<Test, WriteEventError>
where
    I: IntoIterator + 'a,
    I::Item: AsRef<str>,
    I::IntoIter: 'a,
    S: EventSink,
{
    KtapParser::new(config, sink).parse_run_tests(kernel_output)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum NodeKind {
    /// Introduced by a version header. Consumes subtests until the input is exhausted.
    Main,
    /// Introduced by a `# Subtest:` header.
    Suite,
    /// A single result line.
    Case,
}

/// Parses KTAP output into a tree of [`Test`]s.
#[derive(Debug)]
pub struct KtapParser<'c, S> {
    config: &'c ParserConfig,
    sink: S,
}

impl<'c, S: EventSink> KtapParser<'c, S> {
    /// Creates a new parser that reports events to `sink`.
    pub fn new(config: &'c ParserConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// Returns the event sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Extracts KTAP lines from `kernel_output` and parses them.
    ///
    /// If no version header is found, the returned test has a status of
    /// [`TestStatus::FailureToParse`]. Otherwise its status summarizes the statuses of all the
    /// tests found, unless the plan declared zero tests.
    ///
    /// Problems with the input never cause this to fail: an error is only returned if the sink
    /// fails.
    pub fn parse_run_tests<'a, I>(&mut self, kernel_output: I) -> Result<Test, WriteEventError>
    where
        I: IntoIterator + 'a,
        I::Item: AsRef<str>,
        I::IntoIter: 'a,
    {
        self.sink.report_event(ParseEvent::RunStarted)?;

        let mut lines = extract_tap_lines(kernel_output, self.config);
        let test = if lines.has_next() {
            let mut test = self.parse_test(&mut lines, 0)?;
            if test.status != TestStatus::NoTests {
                test.status = test.counts.status();
            }
            test
        } else {
            let mut test = Test::new();
            self.add_error(&mut test, TestParseError::InvalidInput, 0)?;
            test.status = TestStatus::FailureToParse;
            test
        };

        debug!(
            status = %test.status,
            counts = %test.counts,
            "finished parsing KTAP output"
        );
        self.sink.report_event(ParseEvent::RunFinished { test: &test })?;
        Ok(test)
    }

    /// Parses the next test from `lines`, including all of its subtests.
    ///
    /// `expected_num` is the number that the test's result line should carry.
    fn parse_test(
        &mut self,
        lines: &mut LineStream<'_>,
        expected_num: usize,
    ) -> Result<Test, WriteEventError> {
        let mut test = Test::new();

        let kind = if let Some(header) = lines.peek().and_then(classify::version_header) {
            let accepted = match header.kind {
                classify::VersionKind::Ktap => &self.config.ktap_versions,
                classify::VersionKind::Tap => &self.config.tap_versions,
            };
            if let Err(error) = header.check(accepted) {
                self.add_error(&mut test, error, lines.line_number())?;
            }
            test.log.extend(lines.pop());
            self.parse_plan(lines, &mut test)?;
            NodeKind::Main
        } else {
            self.parse_diagnostics(lines, &mut test);
            if let Some(name) = lines.peek().and_then(classify::subtest_header) {
                test.name = name.to_owned();
                test.log.extend(lines.pop());
                self.parse_plan(lines, &mut test)?;
                self.sink
                    .report_event(ParseEvent::SuiteStarted { test: &test })?;
                NodeKind::Suite
            } else {
                NodeKind::Case
            }
        };
        trace!(?kind, line_number = lines.line_number(), name = %test.name, "classified test");

        if kind != NodeKind::Case {
            test.subtests = self.parse_subtests(lines, &mut test, kind)?;
        }

        if kind != NodeKind::Main {
            self.parse_diagnostics(lines, &mut test);
            if kind == NodeKind::Case || peek_name_matches(lines, &test) {
                self.parse_result(lines, &mut test, expected_num)?;
            } else {
                self.add_error(
                    &mut test,
                    TestParseError::MissingResultLine,
                    lines.line_number(),
                )?;
            }
        }

        bubble_up(&mut test);

        match kind {
            NodeKind::Main => {}
            NodeKind::Suite => self
                .sink
                .report_event(ParseEvent::SuiteFinished { test: &test })?,
            NodeKind::Case => self
                .sink
                .report_event(ParseEvent::CaseFinished { test: &test })?,
        }
        Ok(test)
    }

    fn parse_subtests(
        &mut self,
        lines: &mut LineStream<'_>,
        test: &mut Test,
        kind: NodeKind,
    ) -> Result<Vec<Test>, WriteEventError> {
        let expected_count = test.expected_count;
        let mut subtests = Vec::new();
        let mut test_num = 1;

        // The top-level test keeps going until the input runs out. Other tests stop after the
        // number of subtests in their plan, or if there was no plan, at their own result line.
        while kind == NodeKind::Main || expected_count.is_none_or(|count| test_num <= count) {
            if !lines.has_next() {
                if expected_count.is_some_and(|count| test_num <= count) {
                    self.add_error(test, TestParseError::MissingSubtests, 0)?;
                }
                break;
            }
            if expected_count.is_none() && kind == NodeKind::Suite && peek_name_matches(lines, test)
            {
                break;
            }
            subtests.push(self.parse_test(lines, test_num)?);
            test_num += 1;
        }

        Ok(subtests)
    }

    /// Reads a `1..N` plan line if present.
    fn parse_plan(
        &mut self,
        lines: &mut LineStream<'_>,
        test: &mut Test,
    ) -> Result<(), WriteEventError> {
        let line_number = lines.line_number();
        match lines.peek().and_then(classify::plan) {
            Some(count) => {
                test.log.extend(lines.pop());
                test.expected_count = Some(count);
                if count == 0 {
                    test.status = TestStatus::NoTests;
                    self.add_error(test, TestParseError::NoTestsRun, line_number)?;
                }
            }
            None => {
                test.expected_count = None;
                self.add_error(test, TestParseError::MissingPlan, line_number)?;
            }
        }
        Ok(())
    }

    /// Reads a result line if present, setting the test's name and status from it.
    fn parse_result(
        &mut self,
        lines: &mut LineStream<'_>,
        test: &mut Test,
        expected_num: usize,
    ) -> Result<(), WriteEventError> {
        let line_number = lines.line_number();
        let Some(result) = lines.peek().and_then(classify::result_line) else {
            return Ok(());
        };
        test.name = result.name.to_owned();
        let (ok, number, skip) = (result.ok, result.number, result.skip);
        test.log.extend(lines.pop());

        // Numbering is not resynchronized after a mismatch.
        if number != expected_num {
            self.add_error(
                test,
                TestParseError::TestNumberMismatch {
                    expected: expected_num,
                    found: number,
                },
                line_number,
            )?;
        }

        if test.status == TestStatus::Crashed {
            return Ok(());
        }
        test.status = if skip {
            TestStatus::Skipped
        } else if ok {
            TestStatus::Success
        } else {
            TestStatus::Failure
        };
        Ok(())
    }

    /// Moves diagnostic lines into the test's log, marking the test as crashed if a crash
    /// diagnostic is seen.
    fn parse_diagnostics(&mut self, lines: &mut LineStream<'_>, test: &mut Test) {
        while let Some(line) = lines.peek().filter(|line| classify::is_diagnostic(line)) {
            if classify::is_crash_diagnostic(line) {
                debug!(line_number = lines.line_number(), "found crash diagnostic");
                test.status = TestStatus::Crashed;
            }
            test.log.extend(lines.pop());
        }
    }

    fn add_error(
        &mut self,
        test: &mut Test,
        error: TestParseError,
        line_number: usize,
    ) -> Result<(), WriteEventError> {
        debug!(test_name = %test.name, line_number, "{error}");
        self.sink.report_event(ParseEvent::ErrorRecorded {
            test_name: &test.name,
            error: &error,
            line_number,
        })?;
        test.push_error(error);
        Ok(())
    }
}

/// Returns true if the next line is a result line whose name matches the test's.
///
/// The comparison includes any directive on the result line.
fn peek_name_matches(lines: &LineStream<'_>, test: &Test) -> bool {
    lines
        .peek()
        .and_then(classify::result_line)
        .is_some_and(|result| result.raw_name == test.name)
}

/// Sums subtest counts into the test's own counts.
///
/// A test without subtests counts itself instead. A crash anywhere below the test marks the test
/// itself as crashed.
fn bubble_up(test: &mut Test) {
    for subtest in &test.subtests {
        test.counts.add_subtest_counts(&subtest.counts);
    }
    if test.counts.total() == 0 {
        test.counts.add_status(test.status);
    } else if test.counts.status() == TestStatus::Crashed {
        test.status = TestStatus::Crashed;
    }
}
