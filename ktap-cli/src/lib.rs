// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parses KTAP and TAP test results out of kernel console output.
//!
//! This crate contains the command-line frontend, `ktap`. The parser itself lives in
//! [`ktap_parser`], and the machine-readable output format in [`ktap_metadata`].

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod input;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
