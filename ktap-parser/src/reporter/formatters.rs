// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for dividers and timestamps.

use chrono::{DateTime, Local};
use std::fmt;

/// A message centered within a line of `=` characters.
pub(super) struct DisplayDivider<'a> {
    /// The message, possibly with ANSI escapes.
    pub(super) message: &'a str,
    /// The width of the message as shown on a terminal, not counting escapes.
    pub(super) message_width: usize,
    pub(super) width: usize,
}

impl DisplayDivider<'_> {
    const MIN_SIDE: usize = 3;
}

impl fmt::Display for DisplayDivider<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Account for the spaces on either side of the message.
        let (left, right) = match self.width.checked_sub(self.message_width + 2) {
            Some(diff) if diff > 0 => (diff / 2, diff - diff / 2),
            _ => (Self::MIN_SIDE, Self::MIN_SIDE),
        };
        write!(
            f,
            "{} {} {}",
            "=".repeat(left),
            self.message,
            "=".repeat(right)
        )
    }
}

/// A `[HH:MM:SS] ` prefix.
pub(super) struct DisplayTimestamp(pub(super) DateTime<Local>);

impl fmt::Display for DisplayTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.0.format("%H:%M:%S"))
    }
}
