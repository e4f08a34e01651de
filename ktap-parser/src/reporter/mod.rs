// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reports parse progress as it happens.
//!
//! The parser sends a [`ParseEvent`] to an [`EventSink`] whenever a test is opened or closed, or
//! an error is recorded. The main sink is [`DisplayReporter`], which is constructed via a
//! [`DisplayReporterBuilder`] and prints a human-readable report.

mod displayer;
mod events;
mod formatters;
mod helpers;

pub use displayer::*;
pub use events::*;
