// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to the results produced by the KTAP parser.
//!
//! The types in this crate are shared between the parser library and anything that consumes its
//! machine-readable output, for example a CI harness reading the JSON written by `ktap parse
//! --json`.

mod exit_codes;
mod test_summary;

pub use exit_codes::*;
pub use test_summary::*;
