// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use ktap_parser::{
    config::ParserConfig,
    parser::parse_run_tests,
    reporter::DisplayReporterBuilder,
    test::{Test, TestCounts, TestStatus},
};
use std::sync::LazyLock;

pub(crate) static FIXTURES_DIR: LazyLock<Utf8PathBuf> = LazyLock::new(|| {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("ktap-parser has a parent directory")
        .join("fixtures/ktap")
});

/// A console log under `fixtures/ktap`, along with what parsing it should produce.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KtapFixture {
    pub(crate) file_name: &'static str,
    pub(crate) status: TestStatus,
    pub(crate) counts: TestCounts,
}

impl KtapFixture {
    pub(crate) fn read(&self) -> String {
        let path = FIXTURES_DIR.join(self.file_name);
        std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("reading {path}: {err}"))
    }

    /// Parses the fixture, returning the tree and the report with colors and timestamps disabled.
    pub(crate) fn parse(&self) -> (Test, String) {
        let input = self.read();
        let mut reporter = DisplayReporterBuilder::new()
            .set_timestamps(false)
            .build(String::new());
        let test = parse_run_tests(input.lines(), &ParserConfig::default(), &mut reporter)
            .expect("writing to a string never fails");
        (test, reporter.into_writer())
    }
}

const fn counts(
    passed: usize,
    failed: usize,
    crashed: usize,
    skipped: usize,
    errors: usize,
) -> TestCounts {
    TestCounts {
        passed,
        failed,
        crashed,
        skipped,
        errors,
    }
}

pub(crate) static KTAP_FIXTURES: &[KtapFixture] = &[
    KtapFixture {
        file_name: "all_passed.log",
        status: TestStatus::Success,
        counts: counts(4, 0, 0, 1, 0),
    },
    KtapFixture {
        file_name: "failed.log",
        status: TestStatus::Failure,
        counts: counts(2, 1, 0, 0, 0),
    },
    KtapFixture {
        file_name: "crashed.log",
        status: TestStatus::Crashed,
        counts: counts(1, 0, 1, 0, 0),
    },
    KtapFixture {
        file_name: "skipped.log",
        status: TestStatus::Skipped,
        counts: counts(0, 0, 0, 2, 0),
    },
    KtapFixture {
        file_name: "missing_plan.log",
        status: TestStatus::Success,
        counts: counts(2, 0, 0, 0, 2),
    },
    KtapFixture {
        file_name: "no_header.log",
        status: TestStatus::FailureToParse,
        counts: counts(0, 0, 0, 0, 1),
    },
    KtapFixture {
        file_name: "no_tests.log",
        status: TestStatus::NoTests,
        counts: counts(1, 0, 0, 0, 1),
    },
];
