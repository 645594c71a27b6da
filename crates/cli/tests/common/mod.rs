// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

//! Shared helpers for integration tests.

use std::io::Write;
use tempfile::NamedTempFile;
use testbed::HarnessConfig;

/// Create a temporary config file, `.json` if the content looks like JSON
pub fn write_config(content: &str) -> NamedTempFile {
    let suffix = if content.trim_start().starts_with('{') {
        ".json"
    } else {
        ".toml"
    };
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Config for a suite that prints a line per case
pub fn verbose(name: &str) -> HarnessConfig {
    let mut config = HarnessConfig {
        name: name.to_string(),
        ..HarnessConfig::default()
    };
    config.report.verbose = true;
    config
}
