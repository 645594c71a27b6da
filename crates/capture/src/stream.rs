// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Standard stream identifiers.

use std::fmt;
use std::io;
use std::os::fd::{AsRawFd, RawFd};

/// A process-wide standard output stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdout,
    Stderr,
}

impl StdStream {
    /// Descriptor currently backing the stream
    pub fn fd(self) -> RawFd {
        match self {
            StdStream::Stdout => io::stdout().as_raw_fd(),
            StdStream::Stderr => io::stderr().as_raw_fd(),
        }
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdStream::Stdout => write!(f, "stdout"),
            StdStream::Stderr => write!(f, "stderr"),
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
