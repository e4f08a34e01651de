// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    input::{ConsoleLines, InputSource},
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use ktap_metadata::{KtapExitCode, TestStatus, TestSummary};
use ktap_parser::{
    config::KtapConfig, extract::write_raw_output, parser::parse_run_tests,
    reporter::DisplayReporterBuilder,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
};
use supports_color::Stream;
use tracing::debug;

/// Parses KTAP and TAP test results out of kernel console output.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct KtapApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    config_opts: ConfigOpts,

    #[clap(subcommand)]
    command: Command,
}

impl KtapApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code for the process.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Parse(opts) => opts.exec(&self.config_opts, output, output_writer),
        }
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: .config/ktap.toml in the current directory]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<KtapConfig> {
        let config = KtapConfig::from_sources(".", self.config_file.as_deref())?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse kernel output and report test results
    ///
    /// Kernel output is read from FILE, or from standard input if FILE is missing or `-`. Lines
    /// before the first `KTAP version` or `TAP version` header are ignored.
    Parse(ParseOpts),
}

#[derive(Debug, Args)]
struct ParseOpts {
    /// File containing kernel console output
    #[arg(value_name = "FILE")]
    input: Option<Utf8PathBuf>,

    /// Print the kernel output unchanged instead of parsing it
    #[arg(long, conflicts_with = "json")]
    raw_output: bool,

    /// Write results as JSON to PATH, or to standard output if PATH is `-`
    ///
    /// With `-`, the human-readable report is written to standard error.
    #[arg(long, value_name = "PATH")]
    json: Option<Utf8PathBuf>,

    /// Don't prefix report lines with a timestamp
    #[arg(long)]
    no_timestamps: bool,
}

impl ParseOpts {
    fn exec(
        self,
        config_opts: &ConfigOpts,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let config = config_opts.make_config()?;
        let source = InputSource::new(self.input.as_deref());
        let reader = source.open()?;
        let mut read_error = None;
        let lines = ConsoleLines::new(reader, &mut read_error);

        if self.raw_output {
            write_raw_output(lines, &mut output_writer.stdout_writer())
                .map_err(|err| ExpectedError::WriteRawOutputError { err })?;
            check_read_error(&source, read_error)?;
            return Ok(KtapExitCode::OK);
        }

        let json_to_stdout = self.json.as_deref().is_some_and(|path| path.as_str() == "-");
        let mut builder = DisplayReporterBuilder::from_config(&config.reporter);
        if self.no_timestamps {
            builder.set_timestamps(false);
        }

        let test = if json_to_stdout {
            builder.set_colorize(output.color.should_colorize(Stream::Stderr));
            let reporter = builder.build(output_writer.stderr_writer());
            parse_run_tests(lines, &config.parser, reporter)?
        } else {
            builder.set_colorize(output.color.should_colorize(Stream::Stdout));
            let reporter = builder.build(output_writer.stdout_writer());
            parse_run_tests(lines, &config.parser, reporter)?
        };
        check_read_error(&source, read_error)?;

        if let Some(path) = &self.json {
            let summary = test.to_summary();
            if json_to_stdout {
                write_json(&summary, output_writer.stdout_writer())?;
            } else {
                write_json_file(&summary, path)?;
            }
        }

        debug!(status = %test.status, "exiting");
        Ok(exit_code_for(test.status))
    }
}

fn check_read_error(source: &InputSource, read_error: Option<std::io::Error>) -> Result<()> {
    match read_error {
        Some(err) => Err(ExpectedError::InputReadError {
            input: source.to_string(),
            err,
        }),
        None => Ok(()),
    }
}

fn write_json_file(summary: &TestSummary, path: &Utf8Path) -> Result<()> {
    let file = File::create(path).map_err(|err| ExpectedError::JsonCreateError {
        path: path.to_owned(),
        err,
    })?;
    debug!("writing JSON results to {path}");
    write_json(summary, BufWriter::new(file))
}

fn write_json(summary: &TestSummary, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)
        .map_err(|err| ExpectedError::JsonWriteError { err: err.into() })?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|err| ExpectedError::JsonWriteError { err })
}

fn exit_code_for(status: TestStatus) -> i32 {
    match status {
        TestStatus::Success | TestStatus::Skipped => KtapExitCode::OK,
        TestStatus::NoTests => KtapExitCode::NO_TESTS,
        TestStatus::Failure | TestStatus::Crashed => KtapExitCode::TESTS_FAILED,
        TestStatus::FailureToParse => KtapExitCode::PARSE_FAILED,
    }
}
