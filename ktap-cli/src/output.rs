// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::{Args, ValueEnum};
use ktap_parser::write_str::WriteStr;
use owo_colors::{OwoColorize, Style, style};
use std::{
    env::VarError,
    fmt,
    io::{self, BufWriter, Stderr, Stdout, Write},
    marker::PhantomData,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub(crate) mod clap_styles {
    use clap::builder::{
        Styles,
        styling::{AnsiColor, Effects, Style},
    };

    const HEADER: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
    const USAGE: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
    const LITERAL: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
    const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
    const ERROR: Style = AnsiColor::Red.on_default().effects(Effects::BOLD);
    const VALID: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
    const INVALID: Style = AnsiColor::Yellow.on_default().effects(Effects::BOLD);

    pub(crate) const fn style() -> Styles {
        Styles::styled()
            .header(HEADER)
            .usage(USAGE)
            .literal(LITERAL)
            .placeholder(PLACEHOLDER)
            .error(ERROR)
            .valid(VALID)
            .invalid(INVALID)
    }
}

/// The environment variable used to filter log output.
const LOG_ENV: &str = "KTAP_LOG";

/// Events with this target are printed without an `error:`-style heading.
pub(crate) const NO_HEADING_TARGET: &str = "ktap_cli::no_heading";

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, global = true, env = "KTAP_VERBOSE")]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "KTAP_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;

        color.init(verbose);

        OutputContext { color }
    }
}

#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns general stderr styles for the current output context.
    pub fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();

        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.colorize();
        }

        styles
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

struct SimpleFormatter {
    styles: LogStyles,
}

impl<S, N> FormatEvent<S, N> for SimpleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        if metadata.target() != NO_HEADING_TARGET {
            let (heading, style) = match *metadata.level() {
                Level::ERROR => ("error", self.styles.error),
                Level::WARN => ("warning", self.styles.warning),
                Level::INFO => ("info", self.styles.info),
                Level::DEBUG => ("debug", self.styles.debug),
                Level::TRACE => ("trace", self.styles.trace),
            };
            write!(writer, "{}: ", heading.style(style))?;
        }

        let mut visitor = MessageVisitor {
            writer: &mut writer,
            error: None,
        };

        event.record(&mut visitor);

        if let Some(error) = visitor.error {
            return Err(error);
        }

        writeln!(writer)
    }
}

static MESSAGE_FIELD: &str = "message";

struct MessageVisitor<'writer, 'a> {
    writer: &'a mut format::Writer<'writer>,
    error: Option<fmt::Error>,
}

impl Visit for MessageVisitor<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            if let Err(error) = write!(self.writer, "{value:?}") {
                self.error = Some(error);
            }
        }
    }
}

impl Color {
    pub(crate) fn init(self, verbose: bool) {
        let mut log_styles = LogStyles::default();
        if self.should_colorize(supports_color::Stream::Stderr) {
            log_styles.colorize();
        }

        INIT_LOGGER.call_once(|| {
            let default_level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            let (targets, invalid) = log_targets(std::env::var(LOG_ENV), default_level);

            let layer = tracing_subscriber::fmt::layer()
                .event_format(SimpleFormatter { styles: log_styles })
                .with_writer(std::io::stderr)
                .with_filter(targets);

            tracing_subscriber::registry().with(layer).init();

            if let Some(invalid) = invalid {
                warn!("ignoring {LOG_ENV}: {invalid}");
            }
        });
    }

    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Works out log filters from the value of `KTAP_LOG`.
///
/// Returns the filters to use, along with a description of the problem if the variable was set
/// but couldn't be used.
fn log_targets(
    var: Result<String, VarError>,
    default_level: LevelFilter,
) -> (Targets, Option<String>) {
    let default_targets = Targets::new().with_default(default_level);
    match var {
        Ok(level_str) if level_str.is_empty() => (default_targets, None),
        Ok(level_str) => match level_str.parse() {
            Ok(targets) => (targets, None),
            Err(error) => (default_targets, Some(format!("`{level_str}`: {error}"))),
        },
        Err(VarError::NotPresent) => (default_targets, None),
        Err(VarError::NotUnicode(_)) => (default_targets, Some("not valid UTF-8".to_owned())),
    }
}

#[derive(Debug, Default)]
struct LogStyles {
    error: Style,
    warning: Style,
    info: Style,
    debug: Style,
    trace: Style,
}

impl LogStyles {
    fn colorize(&mut self) {
        self.error = style().red().bold();
        self.warning = style().yellow().bold();
        self.info = style().bold();
        self.debug = style().bold();
        self.trace = style().dimmed();
    }
}

#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
}

impl StderrStyles {
    fn colorize(&mut self) {
        self.bold = style().bold();
    }
}

/// Where `ktap` writes its output.
///
/// Tests use the `Test` variant to capture both streams in memory.
#[derive(Default)]
pub enum OutputWriter {
    /// Write to the process's stdout and stderr.
    #[default]
    Normal,
    /// Capture output in memory.
    #[cfg(test)]
    Test {
        /// Captured stdout.
        stdout: Vec<u8>,
        /// Captured stderr.
        stderr: Vec<u8>,
    },
}

impl OutputWriter {
    pub(crate) fn stdout_writer(&mut self) -> StreamWriter<'_, Stdout> {
        match self {
            Self::Normal => StreamWriter::buffered(io::stdout()),
            #[cfg(test)]
            Self::Test { stdout, .. } => StreamWriter::Captured(stdout),
        }
    }

    pub(crate) fn stderr_writer(&mut self) -> StreamWriter<'_, Stderr> {
        match self {
            Self::Normal => StreamWriter::buffered(io::stderr()),
            #[cfg(test)]
            Self::Test { stderr, .. } => StreamWriter::Captured(stderr),
        }
    }
}

/// One output stream handed out by [`OutputWriter`].
pub(crate) enum StreamWriter<'a, W: Write> {
    Buffered(BufWriter<W>, PhantomData<&'a mut Vec<u8>>),
    #[cfg(test)]
    Captured(&'a mut Vec<u8>),
}

impl<W: Write> StreamWriter<'_, W> {
    fn buffered(stream: W) -> Self {
        Self::Buffered(BufWriter::new(stream), PhantomData)
    }
}

impl<W: Write> Write for StreamWriter<'_, W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            Self::Buffered(buf, _) => buf.write(data),
            #[cfg(test)]
            Self::Captured(buf) => buf.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Buffered(buf, _) => buf.flush(),
            #[cfg(test)]
            Self::Captured(_) => Ok(()),
        }
    }
}

impl<W: Write> WriteStr for StreamWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        self.flush()
    }
}
