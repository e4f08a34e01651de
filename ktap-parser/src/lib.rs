// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Parses KTAP and TAP test results out of kernel console output.
//!
//! The basic flow of operations is:
//!
//! 1. [`extract::extract_tap_lines`] finds the start of the KTAP region in noisy console output
//!    and strips the prefix added by the transport, producing a [`lines::LineStream`].
//! 2. [`parser::KtapParser`] walks the stream recursively, classifying each line with the
//!    functions in [`classify`] and building a tree of [`test::Test`] nodes.
//! 3. As nodes are opened and closed, [`reporter::ParseEvent`]s are sent to an
//!    [`reporter::EventSink`] such as [`reporter::DisplayReporter`], so a human watching a long
//!    test run sees progress as it happens.

pub mod classify;
pub mod config;
pub mod errors;
pub mod extract;
mod helpers;
pub mod lines;
pub mod parser;
pub mod reporter;
#[cfg(test)]
mod test_helpers;
pub mod write_str;
