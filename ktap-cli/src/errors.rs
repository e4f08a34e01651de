// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use ktap_metadata::KtapExitCode;
use ktap_parser::errors::{ConfigParseError, WriteEventError};
use owo_colors::OwoColorize;
use std::{error::Error, io};
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders; errors are meant to be printed with
// display_to_stderr, which colorizes them.

/// An error that `ktap` knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("failed to open input file")]
    InputOpenError {
        path: Utf8PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("failed to read input")]
    InputReadError {
        input: String,
        #[source]
        err: io::Error,
    },
    #[error("failed to write report")]
    WriteEventError {
        #[from]
        err: WriteEventError,
    },
    #[error("failed to write raw output")]
    WriteRawOutputError {
        #[source]
        err: io::Error,
    },
    #[error("failed to create JSON output file")]
    JsonCreateError {
        path: Utf8PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("failed to write JSON output")]
    JsonWriteError {
        #[source]
        err: io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::InputOpenError { .. }
            | Self::InputReadError { .. } => KtapExitCode::SETUP_ERROR,
            Self::WriteEventError { .. }
            | Self::WriteRawOutputError { .. }
            | Self::JsonCreateError { .. }
            | Self::JsonWriteError { .. } => KtapExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::InputOpenError { path, err } => {
                tracing::error!("failed to open input file `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::InputReadError { input, err } => {
                tracing::error!(
                    "failed to read kernel output from {}",
                    input.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::WriteEventError { err } => {
                tracing::error!("failed to write test report");
                err.source()
            }
            Self::WriteRawOutputError { err } => {
                tracing::error!("failed to write raw kernel output");
                Some(err as &dyn Error)
            }
            Self::JsonCreateError { path, err } => {
                tracing::error!(
                    "failed to create JSON output file `{}`",
                    path.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::JsonWriteError { err } => {
                tracing::error!("failed to write JSON output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
