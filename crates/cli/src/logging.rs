// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! Logs go to stderr or a file, never stdout, so they cannot mix with
//! the report. Run with a log file when stderr is being captured.

use crate::diagnostic::print_warning;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive that overrides `level`
pub const LOG_ENV: &str = "TESTBED_LOG";

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Logging configuration (`[log]` table)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive, e.g. "warn" or "testbed=debug"
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Failed to open log file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Build the filter from `TESTBED_LOG` if set, else from `config.level`.
pub fn filter_for(config: &LogConfig, env_directive: Option<&str>) -> Result<EnvFilter, LogError> {
    let directive = env_directive.unwrap_or(&config.level);
    EnvFilter::try_new(directive).map_err(|e| LogError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// A second call returns [`LogError::AlreadyInitialized`]; callers that
/// may run after another subscriber was set can ignore it.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let env_directive = std::env::var(LOG_ENV).ok();
    let filter = filter_for(config, env_directive.as_deref())?;

    match config.file {
        Some(ref path) => {
            let file = open_log_file(path)?;
            init_with_writer(filter, config.format, std::sync::Mutex::new(file))
        }
        None => init_with_writer(filter, config.format, std::io::stderr),
    }
}

/// Install the subscriber for a run; a subscriber that is already set
/// is kept.
///
/// Any other failure is printed as a warning and the run continues
/// without logs.
pub fn init_logging_or_warn(config: &LogConfig) {
    init_logging_or_else(config, |e| {
        print_warning(format_args!("logging disabled: {}", e))
    });
}

fn init_logging_or_else<F: FnOnce(LogError)>(config: &LogConfig, on_error: F) {
    match init_logging(config) {
        Ok(()) | Err(LogError::AlreadyInitialized) => {}
        Err(e) => on_error(e),
    }
}

fn open_log_file(path: &Path) -> Result<File, LogError> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::FileOpen {
            path: path.to_path_buf(),
            source,
        })
}

fn init_with_writer<W>(filter: EnvFilter, format: LogFormat, writer: W) -> Result<(), LogError>
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_writer(writer)).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(writer)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(writer)).try_init(),
    };
    result.map_err(|_| LogError::AlreadyInitialized)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
