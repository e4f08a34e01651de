// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) skip: Style,
    pub(super) log: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
        self.log = Style::new().yellow().bold();
    }
}
