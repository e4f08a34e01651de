// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless classifiers for individual KTAP lines.
//!
//! Each function here looks at exactly one line of text and either recognizes it or doesn't. The
//! parser combines them with one line of lookahead.

use crate::errors::TestParseError;
use regex::Regex;
use std::{fmt, sync::LazyLock};

static KTAP_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^KTAP version ([0-9]+)$").unwrap());
static TAP_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TAP version ([0-9]+)$").unwrap());
static TEST_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# Subtest: (.*)$").unwrap());
static TEST_PLAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^1\.\.([0-9]+)").unwrap());
static TEST_RESULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ok|not ok) ([0-9]+) (- )?(.*)$").unwrap());
static TEST_RESULT_SKIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ok|not ok) ([0-9]+) (- )?(.*) # SKIP(.*)$").unwrap());
static DIAGNOSTIC_CRASH_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# .*?: kunit test case crashed!$").unwrap());

/// The flavor of a version header line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VersionKind {
    /// `KTAP version N`.
    Ktap,

    /// `TAP version N`.
    Tap,
}

impl VersionKind {
    /// Returns the string used for this kind in version header lines.
    pub fn to_static_str(self) -> &'static str {
        match self {
            VersionKind::Ktap => "KTAP",
            VersionKind::Tap => "TAP",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_static_str())
    }
}

/// A parsed `KTAP version N` or `TAP version N` line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VersionHeader {
    /// Whether this is a KTAP or a TAP header.
    pub kind: VersionKind,

    /// The version number.
    pub version: u32,
}

impl VersionHeader {
    /// Checks this version against the list of accepted versions for its kind.
    ///
    /// Returns an error if the version is lower than the lowest accepted version or higher than the
    /// highest. An empty list accepts every version.
    pub fn check(&self, accepted: &[u32]) -> Result<(), TestParseError> {
        let (Some(&min), Some(&max)) = (accepted.iter().min(), accepted.iter().max()) else {
            return Ok(());
        };
        if self.version < min {
            Err(TestParseError::VersionTooLow {
                kind: self.kind,
                version: self.version,
            })
        } else if self.version > max {
            Err(TestParseError::VersionTooHigh {
                kind: self.kind,
                version: self.version,
            })
        } else {
            Ok(())
        }
    }
}

/// A parsed `ok`/`not ok` result line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ResultLine<'a> {
    /// True for `ok`, false for `not ok`.
    pub ok: bool,

    /// The test number stated on the line.
    pub number: usize,

    /// Everything after the number (and the optional `- `), including any directive.
    ///
    /// This is what subtest headers are matched against.
    pub raw_name: &'a str,

    /// The test name with any `# SKIP` directive removed.
    pub name: &'a str,

    /// True if the line carries a `# SKIP` directive.
    pub skip: bool,
}

/// Recognizes a `KTAP version N` or `TAP version N` line.
pub fn version_header(line: &str) -> Option<VersionHeader> {
    let (kind, captures) = if let Some(captures) = KTAP_START.captures(line) {
        (VersionKind::Ktap, captures)
    } else {
        (VersionKind::Tap, TAP_START.captures(line)?)
    };
    let version = parse_saturating(&captures[1], u32::MAX);
    Some(VersionHeader { kind, version })
}

/// Recognizes a `# Subtest: <name>` line, returning the name.
pub fn subtest_header(line: &str) -> Option<&str> {
    let captures = TEST_HEADER.captures(line)?;
    captures.get(1).map(|m| m.as_str())
}

/// Recognizes a `1..N` plan line, returning `N`.
///
/// Counts too large for `usize` become `usize::MAX`.
pub fn plan(line: &str) -> Option<usize> {
    let captures = TEST_PLAN.captures(line)?;
    Some(parse_saturating(&captures[1], usize::MAX))
}

/// Recognizes a result line.
///
/// Every line the result pattern matches is recognized. Test numbers too large for `usize` become
/// `usize::MAX`.
pub fn result_line(line: &str) -> Option<ResultLine<'_>> {
    let captures = TEST_RESULT.captures(line)?;
    let ok = &captures[1] == "ok";
    let number = parse_saturating(&captures[2], usize::MAX);
    let raw_name = captures.get(4).map_or("", |m| m.as_str());

    let (name, skip) = match TEST_RESULT_SKIP.captures(line) {
        Some(skip_captures) => (skip_captures.get(4).map_or("", |m| m.as_str()), true),
        None => (raw_name, false),
    };

    Some(ResultLine {
        ok,
        number,
        raw_name,
        name,
        skip,
    })
}

/// Returns true if the line is a `kunit test case crashed!` diagnostic.
pub fn is_crash_diagnostic(line: &str) -> bool {
    DIAGNOSTIC_CRASH_MESSAGE.is_match(line)
}

/// Returns true if the line is a diagnostic line: neither a result line nor a subtest header.
pub fn is_diagnostic(line: &str) -> bool {
    !TEST_RESULT.is_match(line) && !TEST_HEADER.is_match(line)
}

// The patterns only capture ASCII digits, so the only way parsing fails is overflow.
fn parse_saturating<T: std::str::FromStr>(digits: &str, max: T) -> T {
    digits.parse().unwrap_or(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("KTAP version 1", Some((VersionKind::Ktap, 1)) ; "ktap")]
    #[test_case("TAP version 14", Some((VersionKind::Tap, 14)) ; "tap")]
    #[test_case("KTAP version 1 ", None ; "trailing space")]
    #[test_case("  KTAP version 1", None ; "leading space")]
    #[test_case("KTAP version x", None ; "not a number")]
    #[test_case("KTAP version 99999999999999", Some((VersionKind::Ktap, u32::MAX)) ; "overflow")]
    #[test_case("TAP version 4294967296", Some((VersionKind::Tap, u32::MAX)) ; "one past u32 max")]
    #[test_case("ok 1 foo", None ; "result line")]
    fn test_version_header(line: &str, expected: Option<(VersionKind, u32)>) {
        let actual = version_header(line).map(|header| (header.kind, header.version));
        assert_eq!(actual, expected);
    }

    #[test_case(VersionKind::Ktap, 1, &[1], None ; "ktap accepted")]
    #[test_case(VersionKind::Ktap, 0, &[1], Some("KTAP version lower than expected!") ; "ktap too low")]
    #[test_case(VersionKind::Ktap, 2, &[1], Some("KTAP version higher than expected!") ; "ktap too high")]
    #[test_case(VersionKind::Tap, 13, &[13, 14], None ; "tap 13")]
    #[test_case(VersionKind::Tap, 14, &[13, 14], None ; "tap 14")]
    #[test_case(VersionKind::Tap, 12, &[13, 14], Some("TAP version lower than expected!") ; "tap too low")]
    #[test_case(VersionKind::Tap, 15, &[13, 14], Some("TAP version higher than expected!") ; "tap too high")]
    #[test_case(VersionKind::Tap, 99, &[], None ; "empty accepts all")]
    fn test_version_check(kind: VersionKind, version: u32, accepted: &[u32], error: Option<&str>) {
        let header = VersionHeader { kind, version };
        let actual = header.check(accepted).err().map(|err| err.to_string());
        assert_eq!(actual.as_deref(), error);
    }

    #[test_case("# Subtest: example", Some("example") ; "basic")]
    #[test_case("# Subtest: ", Some("") ; "empty name")]
    #[test_case("# Subtest: with spaces in name", Some("with spaces in name") ; "spaces")]
    #[test_case("    # Subtest: example", None ; "indented")]
    #[test_case("# example: some diagnostic", None ; "diagnostic")]
    fn test_subtest_header(line: &str, expected: Option<&str>) {
        assert_eq!(subtest_header(line), expected);
    }

    #[test_case("1..4", Some(4) ; "basic")]
    #[test_case("1..0", Some(0) ; "zero")]
    #[test_case("1..12 # trailing", Some(12) ; "trailing text")]
    #[test_case("1..99999999999999999999999", Some(usize::MAX) ; "overflow")]
    #[test_case("2..4", None ; "wrong start")]
    #[test_case("1..", None ; "missing count")]
    #[test_case("# 1..4", None ; "diagnostic")]
    fn test_plan(line: &str, expected: Option<usize>) {
        assert_eq!(plan(line), expected);
    }

    #[test_case("ok 1 example", Some((true, 1, "example", "example", false)) ; "ok")]
    #[test_case("not ok 2 example", Some((false, 2, "example", "example", false)) ; "not ok")]
    #[test_case("ok 3 - example", Some((true, 3, "example", "example", false)) ; "dash")]
    #[test_case(
        "ok 4 example # SKIP not supported",
        Some((true, 4, "example # SKIP not supported", "example", true)) ;
        "skip"
    )]
    #[test_case(
        "not ok 5 - example # SKIP",
        Some((false, 5, "example # SKIP", "example", true)) ;
        "skip without reason"
    )]
    #[test_case("ok 6 example # TODO later", Some((true, 6, "example # TODO later", "example # TODO later", false)) ; "other directive stays in name")]
    #[test_case(
        "ok 99999999999999999999 example",
        Some((true, usize::MAX, "example", "example", false)) ;
        "number overflow"
    )]
    #[test_case("ok example", None ; "missing number")]
    #[test_case("okay 1 example", None ; "bad keyword")]
    #[test_case("  ok 1 example", None ; "indented")]
    fn test_result_line(line: &str, expected: Option<(bool, usize, &str, &str, bool)>) {
        let actual =
            result_line(line).map(|r| (r.ok, r.number, r.raw_name, r.name, r.skip));
        assert_eq!(actual, expected);
    }

    #[test_case("# example_test: kunit test case crashed!", true ; "crash")]
    #[test_case("# a: b: kunit test case crashed!", true ; "nested colon")]
    #[test_case("# example_test: kunit test case crashed! again", false ; "trailing text")]
    #[test_case("example_test: kunit test case crashed!", false ; "no hash")]
    fn test_crash_diagnostic(line: &str, expected: bool) {
        assert_eq!(is_crash_diagnostic(line), expected);
    }

    #[test_case("# some diagnostic", true ; "hash diagnostic")]
    #[test_case("random kernel noise", true ; "noise")]
    #[test_case("1..4", true ; "plan is a diagnostic here")]
    #[test_case("ok 1 foo", false ; "result line")]
    #[test_case("# Subtest: foo", false ; "subtest header")]
    fn test_is_diagnostic(line: &str, expected: bool) {
        assert_eq!(is_diagnostic(line), expected);
    }
}
