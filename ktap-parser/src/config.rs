// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the KTAP parser and reporter.
//!
//! The default config is embedded in the library. A repository can layer its own settings on top
//! by placing them in `.config/ktap.toml`.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Overall configuration for a KTAP parse.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KtapConfig {
    /// Settings that affect how lines are extracted and parsed.
    pub parser: ParserConfig,

    /// Settings that affect the human-readable report.
    pub reporter: ReporterConfig,
}

impl KtapConfig {
    /// The default location of the config within a directory.
    pub const CONFIG_PATH: &'static str = ".config/ktap.toml";

    /// Contains the default config as a TOML file.
    ///
    /// User-specified configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from `.config/ktap.toml` within
    /// `dir`.
    ///
    /// An explicitly specified file must exist. If no file is specified and `.config/ktap.toml`
    /// doesn't exist either, the default config is used.
    pub fn from_sources(
        dir: impl AsRef<Utf8Path>,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(dir.as_ref(), config_file, |config_file, unknown| {
            let mut unknown_str = String::new();
            for ignored_key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(ignored_key);
            }
            warn!("ignoring unknown configuration keys in config file {config_file}:{unknown_str}");
        })
    }

    fn from_sources_impl(
        dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (
                file.to_owned(),
                File::new(file.as_str(), FileFormat::Toml),
            ),
            None => {
                let config_file: Utf8PathBuf = dir.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        Ok(config)
    }

    fn make_default_config() -> config::ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &config::ConfigBuilder<DefaultState>,
    ) -> Result<(KtapConfig, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: KtapConfig = serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The config crate also reports the key, so drop it from the inner error.
            let path = error.path().clone();
            let config_error = error.into_inner();
            let error = match config_error {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

        Ok((config, ignored))
    }
}

/// Settings that control line extraction and parsing.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserConfig {
    /// Accepted `KTAP version N` values.
    pub ktap_versions: Vec<u32>,

    /// Accepted `TAP version N` values.
    pub tap_versions: Vec<u32>,

    /// Console output after the first line containing one of these strings is ignored.
    pub end_markers: Vec<String>,
}

impl ParserConfig {
    /// Versions accepted by default for `KTAP version N` headers.
    pub const DEFAULT_KTAP_VERSIONS: &'static [u32] = &[1];

    /// Versions accepted by default for `TAP version N` headers.
    pub const DEFAULT_TAP_VERSIONS: &'static [u32] = &[13, 14];

    /// Markers printed by the kernel once a test run is over.
    pub const DEFAULT_END_MARKERS: &'static [&'static str] = &[
        "List of all partitions:",
        "Kernel panic - not syncing: VFS:",
        "reboot: System halted",
    ];
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ktap_versions: Self::DEFAULT_KTAP_VERSIONS.to_vec(),
            tap_versions: Self::DEFAULT_TAP_VERSIONS.to_vec(),
            end_markers: Self::DEFAULT_END_MARKERS
                .iter()
                .map(|&marker| marker.to_owned())
                .collect(),
        }
    }
}

/// Settings that control the human-readable report.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReporterConfig {
    /// The width of dividers around headers and footers.
    pub divider_width: usize,

    /// Whether to prefix output lines with a timestamp.
    pub timestamps: bool,
}

impl ReporterConfig {
    /// The default divider width.
    pub const DEFAULT_DIVIDER_WIDTH: usize = 60;
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            divider_width: Self::DEFAULT_DIVIDER_WIDTH,
            timestamps: true,
        }
    }
}
