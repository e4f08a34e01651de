// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading kernel console output.

use crate::errors::ExpectedError;
use bstr::{ByteVec, io::BufReadExt};
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
};
use tracing::debug;

/// Where kernel output is read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum InputSource {
    Stdin,
    File(Utf8PathBuf),
}

impl InputSource {
    pub(crate) fn new(path: Option<&Utf8Path>) -> Self {
        match path {
            Some(path) if path.as_str() != "-" => Self::File(path.to_owned()),
            _ => Self::Stdin,
        }
    }

    pub(crate) fn open(&self) -> Result<Box<dyn BufRead>, ExpectedError> {
        match self {
            Self::Stdin => {
                debug!("reading kernel output from stdin");
                Ok(Box::new(io::stdin().lock()))
            }
            Self::File(path) => {
                debug!("reading kernel output from {path}");
                let file = File::open(path).map_err(|err| ExpectedError::InputOpenError {
                    path: path.clone(),
                    err,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

/// An iterator over the lines of console output.
///
/// Bytes that aren't valid UTF-8 are replaced. Both `\n` and `\r\n` line endings are accepted.
///
/// The first read error ends iteration and is stored in the slot passed to [`Self::new`].
pub(crate) struct ConsoleLines<'e, R> {
    lines: bstr::io::ByteLines<R>,
    error: &'e mut Option<io::Error>,
}

impl<'e, R: BufRead> ConsoleLines<'e, R> {
    pub(crate) fn new(reader: R, error: &'e mut Option<io::Error>) -> Self {
        Self {
            lines: reader.byte_lines(),
            error,
        }
    }
}

impl<R: BufRead> Iterator for ConsoleLines<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        match self.lines.next()? {
            Ok(line) => Some(line.into_string_lossy()),
            Err(error) => {
                *self.error = Some(error);
                None
            }
        }
    }
}
