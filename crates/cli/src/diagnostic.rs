// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error and warning lines on stderr, colored when stderr is a terminal.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }

    /// SGR color code: red or yellow
    fn color(self) -> u8 {
        match self {
            Severity::Error => 31,
            Severity::Warning => 33,
        }
    }
}

fn write_diagnostic<W: Write>(writer: &mut W, severity: Severity, msg: impl Display, is_terminal: bool) {
    let _ = if is_terminal {
        writeln!(
            writer,
            "\x1b[{}m{}: {}\x1b[0m",
            severity.color(),
            severity.label(),
            msg
        )
    } else {
        writeln!(writer, "{}: {}", severity.label(), msg)
    };
}

fn emit(severity: Severity, msg: impl Display) {
    let stderr = io::stderr();
    let is_tty = stderr.is_terminal();
    write_diagnostic(&mut stderr.lock(), severity, msg, is_tty);
}

/// Print `Error: <msg>` to stderr.
pub fn print_error(msg: impl Display) {
    emit(Severity::Error, msg);
}

/// Print `Warning: <msg>` to stderr.
pub fn print_warning(msg: impl Display) {
    emit(Severity::Warning, msg);
}

#[cfg(test)]
#[path = "diagnostic_tests.rs"]
mod tests;
