// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `testbed` binary entry point.

use clap::Parser;

use testbed::check::exit_codes;
use testbed::cli::Cli;
use testbed::diagnostic::print_error;
use testbed::logging::{init_logging_or_warn, LogConfig};

fn main() {
    let cli = Cli::parse();

    let log = cli
        .config
        .as_deref()
        .and_then(|path| testbed::config::HarnessConfig::load(path).ok())
        .map(|config| config.log)
        .unwrap_or_else(LogConfig::default);
    init_logging_or_warn(&log);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli.execute(&mut stdout) {
        print_error(e);
        std::process::exit(exit_codes::FAILURE);
    }
}
