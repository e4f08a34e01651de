// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    config::ParserConfig,
    errors::WriteEventError,
    parser::parse_run_tests,
    reporter::{EventSink, ParseEvent},
    test::{Test, TestStatus},
};

/// An owned copy of a [`ParseEvent`], for comparing against expected events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum RecordedEvent {
    RunStarted,
    SuiteStarted(String),
    CaseFinished(String, TestStatus),
    SuiteFinished(String, TestStatus),
    ErrorRecorded {
        test_name: String,
        message: String,
        line_number: usize,
    },
    RunFinished(TestStatus),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) events: Vec<RecordedEvent>,
}

impl EventSink for RecordingSink {
    fn report_event(&mut self, event: ParseEvent<'_>) -> Result<(), WriteEventError> {
        let event = match event {
            ParseEvent::RunStarted => RecordedEvent::RunStarted,
            ParseEvent::SuiteStarted { test } => RecordedEvent::SuiteStarted(test.name.clone()),
            ParseEvent::CaseFinished { test } => {
                RecordedEvent::CaseFinished(test.name.clone(), test.status)
            }
            ParseEvent::SuiteFinished { test } => {
                RecordedEvent::SuiteFinished(test.name.clone(), test.status)
            }
            ParseEvent::ErrorRecorded {
                test_name,
                error,
                line_number,
            } => RecordedEvent::ErrorRecorded {
                test_name: test_name.to_owned(),
                message: error.to_string(),
                line_number,
            },
            ParseEvent::RunFinished { test } => RecordedEvent::RunFinished(test.status),
        };
        self.events.push(event);
        Ok(())
    }
}

/// Parses `input` with the default config, returning the tree and the events reported.
pub(crate) fn parse_recorded(input: &str) -> (Test, Vec<RecordedEvent>) {
    let config = ParserConfig::default();
    let mut sink = RecordingSink::default();
    let test =
        parse_run_tests(input.lines(), &config, &mut sink).expect("recording sink never fails");
    (test, sink.events)
}

/// Parses `input` with the default config, discarding events.
pub(crate) fn parse(input: &str) -> Test {
    parse_recorded(input).0
}
