// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `ktap` failures.
///
/// `ktap` invocations may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum KtapExitCode {}

impl KtapExitCode {
    /// All parsed tests passed or were skipped.
    pub const OK: i32 = 0;

    /// The KTAP output declared a plan of zero tests.
    pub const NO_TESTS: i32 = 4;

    /// A user issue happened while setting up a `ktap` invocation, e.g. an unreadable input file or
    /// an invalid config file.
    pub const SETUP_ERROR: i32 = 96;

    /// One or more tests failed or crashed.
    pub const TESTS_FAILED: i32 = 100;

    /// No KTAP or TAP output could be found in the input.
    pub const PARSE_FAILED: i32 = 104;

    /// Writing data to stdout, stderr or an output file produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
