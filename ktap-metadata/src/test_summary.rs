// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a test, or of a group of tests.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    /// The test passed.
    Success,

    /// The test failed.
    Failure,

    /// The test was skipped.
    Skipped,

    /// The test crashed, as reported by a crash diagnostic line.
    Crashed,

    /// The test declared a plan of zero subtests.
    NoTests,

    /// No KTAP or TAP output could be found at all.
    FailureToParse,
}

impl TestStatus {
    /// Returns the string representation of this status.
    pub fn to_static_str(self) -> &'static str {
        match self {
            TestStatus::Success => "success",
            TestStatus::Failure => "failure",
            TestStatus::Skipped => "skipped",
            TestStatus::Crashed => "crashed",
            TestStatus::NoTests => "no-tests",
            TestStatus::FailureToParse => "failure-to-parse",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// Counts of test statuses and parse errors.
///
/// For a test with subtests, the counts are the sums over all subtests. For a test case with no
/// subtests, the counts describe the test case itself, so that [`total`](Self::total) is 1.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCounts {
    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that crashed.
    pub crashed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The number of parse errors in the test and its subtests.
    pub errors: usize,
}

impl TestCounts {
    /// Returns the total number of test outcomes, not counting errors.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.crashed + self.skipped
    }

    /// Adds the counts of a subtest to these counts.
    pub fn add_subtest_counts(&mut self, counts: &TestCounts) {
        self.passed += counts.passed;
        self.failed += counts.failed;
        self.crashed += counts.crashed;
        self.skipped += counts.skipped;
        self.errors += counts.errors;
    }

    /// Returns the status implied by these counts.
    ///
    /// Crashes take precedence over failures, which take precedence over passes. If nothing
    /// passed, failed or crashed, the status is [`TestStatus::Skipped`].
    pub fn status(&self) -> TestStatus {
        if self.crashed > 0 {
            TestStatus::Crashed
        } else if self.failed > 0 {
            TestStatus::Failure
        } else if self.passed > 0 {
            TestStatus::Success
        } else {
            TestStatus::Skipped
        }
    }

    /// Records a single test with the given status.
    pub fn add_status(&mut self, status: TestStatus) {
        match status {
            // A test with no subtests did not fail, crash or get skipped, so passed is the closest
            // fit.
            TestStatus::Success | TestStatus::NoTests => self.passed += 1,
            TestStatus::Failure => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Crashed | TestStatus::FailureToParse => self.crashed += 1,
        }
    }
}

impl fmt::Display for TestCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Passed: {}, Failed: {}, Crashed: {}, Skipped: {}, Errors: {}",
            self.passed, self.failed, self.crashed, self.skipped, self.errors
        )
    }
}

/// Machine-readable summary of a parsed test and its subtests.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct TestSummary {
    /// The name of the test. Empty for the top-level test.
    pub name: String,

    /// The final status of the test.
    pub status: TestStatus,

    /// The number of subtests declared by the test plan, if one was found.
    pub expected_count: Option<usize>,

    /// Aggregated counts for this test.
    pub counts: TestCounts,

    /// Parse errors recorded on this test itself, not including errors in subtests.
    #[serde(default)]
    pub errors: Vec<String>,

    /// Lines consumed while parsing this test.
    #[serde(default)]
    pub log: Vec<String>,

    /// Summaries of the subtests, in the order they were parsed.
    #[serde(default)]
    pub subtests: Vec<TestSummary>,
}

impl TestSummary {
    /// Creates a new summary with no errors, log lines or subtests.
    pub fn new(
        name: impl Into<String>,
        status: TestStatus,
        expected_count: Option<usize>,
        counts: TestCounts,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            expected_count,
            counts,
            errors: Vec::new(),
            log: Vec::new(),
            subtests: Vec::new(),
        }
    }

    /// Parses JSON output produced by `ktap parse --json`.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json.as_ref())
    }

    /// Returns an iterator over this summary and all of its descendants, in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &TestSummary> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.subtests.iter().rev());
            Some(next)
        })
    }
}
