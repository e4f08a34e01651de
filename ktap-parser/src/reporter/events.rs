// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events produced while parsing.
//!
//! Events are produced in traversal order, interleaved with reading lines: a suite's header is
//! reported before any of its subtests are read, and its footer after all of them.

use crate::{
    errors::{TestParseError, WriteEventError},
    test::Test,
};

/// An event that occurs during a parse.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum ParseEvent<'a> {
    /// The parse started, before any input was read.
    RunStarted,

    /// A `# Subtest:` header and its plan line were read.
    ///
    /// The subtests of `test` have not been read yet.
    SuiteStarted {
        /// The suite. Only its name, expected count and log are populated.
        test: &'a Test,
    },

    /// A test case without subtests was finished.
    CaseFinished {
        /// The finished test case.
        test: &'a Test,
    },

    /// A suite and all of its subtests were finished.
    SuiteFinished {
        /// The finished suite.
        test: &'a Test,
    },

    /// A parse error was recorded.
    ErrorRecorded {
        /// The name of the test the error was recorded on, as known at the time.
        test_name: &'a str,

        /// The error.
        error: &'a TestParseError,

        /// The source line number of the next unread line, or 0 if the input was exhausted.
        line_number: usize,
    },

    /// The parse finished.
    RunFinished {
        /// The top-level test with its final status.
        test: &'a Test,
    },
}

/// A destination for [`ParseEvent`]s.
pub trait EventSink {
    /// Handles a single event.
    ///
    /// Returning an error aborts the parse.
    fn report_event(&mut self, event: ParseEvent<'_>) -> Result<(), WriteEventError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn report_event(&mut self, event: ParseEvent<'_>) -> Result<(), WriteEventError> {
        (**self).report_event(event)
    }
}

/// An [`EventSink`] that ignores all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardEvents;

impl EventSink for DiscardEvents {
    fn report_event(&mut self, _event: ParseEvent<'_>) -> Result<(), WriteEventError> {
        Ok(())
    }
}
