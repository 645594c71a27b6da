// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness configuration for TOML/JSON config files.

use crate::link::{self, LinkError, WrapSpec};
use crate::logging::LogConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Path of a config file to load
pub const CONFIG_ENV: &str = "TESTBED_CONFIG";
/// Overrides `filter`
pub const FILTER_ENV: &str = "TESTBED_FILTER";
/// Overrides `isolation`
pub const ISOLATION_ENV: &str = "TESTBED_ISOLATION";
/// Overrides `report.format`
pub const FORMAT_ENV: &str = "TESTBED_FORMAT";

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid filter pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid wrap configuration: {0}")]
    Link(#[from] LinkError),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },
}

/// How each case is executed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Cases share the runner's process; a fault ends the run
    #[default]
    InProcess,
    /// Each case runs in a forked child
    Subprocess,
}

impl fmt::Display for Isolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Isolation::InProcess => write!(f, "in_process"),
            Isolation::Subprocess => write!(f, "subprocess"),
        }
    }
}

impl FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_process" | "in-process" => Ok(Isolation::InProcess),
            "subprocess" => Ok(Isolation::Subprocess),
            other => Err(format!("unknown isolation '{}'", other)),
        }
    }
}

/// Report rendering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// `[report]` table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Print one line per case, not only failures and totals
    #[serde(default)]
    pub verbose: bool,

    /// Also write the JSON report to this file
    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

/// Top-level harness configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Suite name shown in reports
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub isolation: Isolation,

    /// Regular expression; only cases whose name matches run
    #[serde(default)]
    pub filter: Option<String>,

    /// Stop after the first case that records a failure
    #[serde(default)]
    pub fail_fast: bool,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Link-time wraps the test binary is built with
    #[serde(default, rename = "wrap")]
    pub wraps: Vec<WrapSpec>,
}

impl HarnessConfig {
    /// Load and validate a TOML or JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: HarnessConfig = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration from `TESTBED_CONFIG` (or defaults) plus env overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TESTBED_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(FILTER_ENV) {
            self.filter = Some(filter).filter(|f| !f.is_empty());
        }
        if let Some(value) = lookup(ISOLATION_ENV) {
            self.isolation = value.parse().map_err(|_| ConfigError::Env {
                var: ISOLATION_ENV,
                value,
            })?;
        }
        if let Some(value) = lookup(FORMAT_ENV) {
            self.report.format = value.parse().map_err(|_| ConfigError::Env {
                var: FORMAT_ENV,
                value,
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter_regex()?;
        link::validate(&self.wraps)?;
        Ok(())
    }

    /// Compiled case filter, if any
    pub fn filter_regex(&self) -> Result<Option<Regex>, ConfigError> {
        Ok(self.filter.as_deref().map(Regex::new).transpose()?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
