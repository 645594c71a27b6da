// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface of the `testbed` binary.

use crate::config::{HarnessConfig, CONFIG_ENV};
use crate::link::{self, ArgStyle};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Build and configuration helper for testbed harnesses
#[derive(Parser, Debug)]
#[command(name = "testbed", version, about = "Test harness configuration helper")]
pub struct Cli {
    /// Harness config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print one linker argument per configured wrap
    LinkArgs {
        /// Emit `cargo:rustc-link-arg=` lines for a build script
        #[arg(long)]
        cargo: bool,
    },
    /// Load and validate a config, printing a one-line summary
    CheckConfig,
}

/// Errors surfaced by a subcommand
#[derive(Debug, Error)]
pub enum CliError {
    #[error("no config file given (use --config or set {})", CONFIG_ENV)]
    MissingConfig,

    #[error("{path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: crate::config::ConfigError,
    },

    #[error(transparent)]
    Link(#[from] crate::link::LinkError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Cli {
    /// Load the config named by `--config`/`TESTBED_CONFIG`.
    pub fn load_config(&self) -> Result<HarnessConfig, CliError> {
        let path = self.config.as_deref().ok_or(CliError::MissingConfig)?;
        load(path)
    }

    /// Run the subcommand, writing its output to `out`.
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let config = self.load_config()?;
        match self.command {
            Command::LinkArgs { cargo } => {
                let style = if cargo { ArgStyle::Cargo } else { ArgStyle::Driver };
                for arg in link::link_args(&config.wraps, style)? {
                    writeln!(out, "{}", arg)?;
                }
            }
            Command::CheckConfig => {
                let name = if config.name.is_empty() {
                    "(unnamed)"
                } else {
                    config.name.as_str()
                };
                writeln!(
                    out,
                    "{}: ok ({} wraps, isolation {}, filter {})",
                    name,
                    config.wraps.len(),
                    config.isolation,
                    config.filter.as_deref().unwrap_or("none"),
                )?;
            }
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<HarnessConfig, CliError> {
    HarnessConfig::load(path).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
