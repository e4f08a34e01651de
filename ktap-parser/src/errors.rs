// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the KTAP parser.

use crate::classify::VersionKind;
use camino::Utf8PathBuf;
use config::ConfigError;
use std::io;
use thiserror::Error;

/// A problem found while parsing KTAP output.
///
/// These errors never abort parsing. They are recorded on the [`Test`](crate::test::Test) where
/// they were found, counted in its [`TestCounts`](ktap_metadata::TestCounts), and reported as they
/// happen.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestParseError {
    /// A test header was not followed by a `1..N` plan line.
    #[error("missing plan line!")]
    MissingPlan,

    /// The plan line declared zero tests.
    #[error("0 tests run!")]
    NoTestsRun,

    /// The input ended before all subtests declared by the plan were seen.
    #[error("missing expected subtests!")]
    MissingSubtests,

    /// A subtest header was not closed by a result line with a matching name.
    #[error("missing subtest result line!")]
    MissingResultLine,

    /// The number on a result line didn't match its position.
    #[error("Expected test number {expected} but found {found}")]
    TestNumberMismatch {
        /// The expected test number.
        expected: usize,

        /// The number found on the result line.
        found: usize,
    },

    /// The version header had a version lower than any accepted version.
    #[error("{kind} version lower than expected!")]
    VersionTooLow {
        /// The header flavor.
        kind: VersionKind,

        /// The version found.
        version: u32,
    },

    /// The version header had a version higher than any accepted version.
    #[error("{kind} version higher than expected!")]
    VersionTooHigh {
        /// The header flavor.
        kind: VersionKind,

        /// The version found.
        version: u32,
    },

    /// No KTAP or TAP version header was found anywhere in the input.
    #[error("invalid KTAP input!")]
    InvalidInput,
}

/// An error that occurs while writing a parse event to its destination.
///
/// This is the only kind of error that stops a parse early.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] io::Error),
}

/// An error that occurred while reading the KTAP parser config.
#[derive(Debug, Error)]
#[error("failed to parse ktap config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while reading the config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config, e.g. the file was missing or had invalid TOML.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}
