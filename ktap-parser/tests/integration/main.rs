// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parses the console logs under `fixtures/ktap` end to end.

mod fixtures;

use fixtures::{KTAP_FIXTURES, KtapFixture};
use indoc::indoc;
use ktap_metadata::TestSummary;
use ktap_parser::test::TestStatus;
use pretty_assertions::assert_eq;

fn fixture(file_name: &str) -> &'static KtapFixture {
    KTAP_FIXTURES
        .iter()
        .find(|fixture| fixture.file_name == file_name)
        .unwrap_or_else(|| panic!("unknown fixture {file_name}"))
}

#[test]
fn test_fixture_statuses() {
    for fixture in KTAP_FIXTURES {
        let (test, _) = fixture.parse();
        assert_eq!(
            (test.status, test.counts),
            (fixture.status, fixture.counts),
            "for fixture {}",
            fixture.file_name
        );
    }
}

#[test]
fn test_all_passed_report() {
    let (test, output) = fixture("all_passed.log").parse();

    assert_eq!(test.subtests.len(), 2);
    assert_eq!(
        output,
        indoc! {"
            ============================================================
            =================== example (2 subtests) ===================
            [PASSED] example_simple_test
            [SKIPPED] example_skip_test
            ===================== [PASSED] example =====================
            ============= string-stream-test (3 subtests) ==============
            [PASSED] string_stream_test_empty_on_creation
            [PASSED] string_stream_test_not_empty_after_add
            [PASSED] string_stream_test_get_string
            =============== [PASSED] string-stream-test ================
            ============================================================
            Testing complete. Passed: 4, Failed: 0, Crashed: 0, Skipped: 1, Errors: 0
        "}
    );
}

#[test]
fn test_failed_report() {
    let (_, output) = fixture("failed.log").parse();

    // Logs of failed tests are printed before their result.
    assert_eq!(
        output,
        indoc! {"
            ============================================================
            ================= sysctl_test (2 subtests) =================
            [PASSED] sysctl_test_dointvec_null_tbl_data
            # sysctl_test_dointvec_table_maxlen_unset: EXPECTATION FAILED at kernel/sysctl-test.c:88
            Expected 0 == proc_dointvec(&table, 0, buffer, &len, &pos), but
            proc_dointvec(&table, 0, buffer, &len, &pos) == -22
            not ok 2 - sysctl_test_dointvec_table_maxlen_unset

            [FAILED] sysctl_test_dointvec_table_maxlen_unset
            # Subtest: sysctl_test
            1..2
            not ok 1 - sysctl_test

            =================== [FAILED] sysctl_test ===================
            =================== example (1 subtests) ===================
            [PASSED] example_simple_test
            ===================== [PASSED] example =====================
            ============================================================
            Testing complete. Passed: 2, Failed: 1, Crashed: 0, Skipped: 0, Errors: 0
        "}
    );
}

#[test]
fn test_crashed_report() {
    let (test, output) = fixture("crashed.log").parse();

    let suite = &test.subtests[0];
    assert_eq!(suite.status, TestStatus::Crashed);
    assert_eq!(suite.subtests[1].status, TestStatus::Crashed);
    assert_eq!(
        output,
        indoc! {"
            ============================================================
            ============= kunit-resource-test (2 subtests) =============
            [PASSED] kunit_resource_test_init_resources
            # kunit_resource_test_alloc_resource: kunit test case crashed!
            not ok 2 - kunit_resource_test_alloc_resource

            [CRASHED] kunit_resource_test_alloc_resource
            # Subtest: kunit-resource-test
            1..2
            not ok 1 - kunit-resource-test

            ============== [CRASHED] kunit-resource-test ===============
            ============================================================
            Testing complete. Passed: 1, Failed: 0, Crashed: 1, Skipped: 0, Errors: 0
        "}
    );
}

#[test]
fn test_error_report() {
    let (_, output) = fixture("missing_plan.log").parse();
    assert_eq!(
        output,
        indoc! {"
            ============================================================
            [ERROR] Test : missing plan line!
            [ERROR] Test suite: missing plan line!
            ========================== suite ===========================
            [PASSED] case_one
            [PASSED] case_two
            ====================== [PASSED] suite ======================
            ============================================================
            Testing complete. Passed: 2, Failed: 0, Crashed: 0, Skipped: 0, Errors: 2
        "}
    );

    let (_, output) = fixture("no_header.log").parse();
    assert_eq!(
        output,
        indoc! {"
            ============================================================
            [ERROR] Test : invalid KTAP input!
            ============================================================
            Testing complete. Passed: 0, Failed: 0, Crashed: 0, Skipped: 0, Errors: 1
        "}
    );
}

#[test]
fn test_summary_json() {
    let (test, _) = fixture("failed.log").parse();
    let summary = test.to_summary();

    let json = serde_json::to_string_pretty(&summary).expect("summary serializes");
    let parsed = TestSummary::parse_json(&json).expect("summary deserializes");
    assert_eq!(parsed, summary);

    let failed: Vec<_> = parsed
        .iter()
        .filter(|summary| summary.status == TestStatus::Failure)
        .map(|summary| summary.name.as_str())
        .collect();
    assert_eq!(
        failed,
        ["", "sysctl_test", "sysctl_test_dointvec_table_maxlen_unset"]
    );
}
