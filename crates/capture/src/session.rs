// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capture sessions.
//!
//! A session swaps the target descriptor for the write end of a pipe and
//! keeps a duplicate of the original so it can be put back. Ending the
//! session restores the original, closes the write side and drains the
//! pipe to end-of-stream.
//!
//! Output is not drained while the scope is open. A producer that writes
//! more than the kernel pipe buffer (64 KiB on Linux) before the session
//! ends will block.

use crate::fdio;
use crate::stream::StdStream;
use nix::errno::Errno;
use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use thiserror::Error;

/// Descriptors with a capture in progress.
static ACTIVE: Mutex<BTreeSet<RawFd>> = parking_lot::const_mutex(BTreeSet::new());

/// Errors that can occur while setting a capture up
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("a capture is already active on {0}")]
    AlreadyActive(String),

    #[error("failed to create capture pipe: {0}")]
    Pipe(#[source] Errno),

    #[error("failed to save {target}: {source}")]
    Save {
        target: String,
        #[source]
        source: Errno,
    },

    #[error("failed to redirect {target}: {source}")]
    Redirect {
        target: String,
        #[source]
        source: Errno,
    },
}

/// An open capture scope on one descriptor
#[derive(Debug)]
pub struct CaptureSession {
    target: RawFd,
    label: String,
    saved: Option<RawFd>,
    read_end: Option<OwnedFd>,
    write_end: Option<OwnedFd>,
}

impl CaptureSession {
    /// Start capturing a standard stream.
    pub fn begin(stream: StdStream) -> Result<Self, CaptureError> {
        Self::open(stream.fd(), stream.to_string())
    }

    /// Start capturing an arbitrary descriptor.
    ///
    /// The caller keeps `fd` open for the lifetime of the session.
    pub fn begin_raw(fd: RawFd) -> Result<Self, CaptureError> {
        Self::open(fd, format!("fd {}", fd))
    }

    fn open(target: RawFd, label: String) -> Result<Self, CaptureError> {
        if !ACTIVE.lock().insert(target) {
            return Err(CaptureError::AlreadyActive(label));
        }
        tracing::debug!(target_fd = target, stream = %label, "beginning capture");

        match Self::redirect_into_pipe(target, &label) {
            Ok((saved, read_end, write_end)) => Ok(Self {
                target,
                label,
                saved: Some(saved),
                read_end: Some(read_end),
                write_end: Some(write_end),
            }),
            Err(e) => {
                ACTIVE.lock().remove(&target);
                tracing::warn!(stream = %label, error = %e, "capture setup failed");
                Err(e)
            }
        }
    }

    fn redirect_into_pipe(
        target: RawFd,
        label: &str,
    ) -> Result<(RawFd, OwnedFd, OwnedFd), CaptureError> {
        fdio::flush_all();

        let (read_end, write_end) = fdio::cloexec_pipe().map_err(CaptureError::Pipe)?;
        let saved = fdio::dup_cloexec(target).map_err(|source| CaptureError::Save {
            target: label.to_string(),
            source,
        })?;

        if let Err(source) = fdio::redirect(write_end.as_raw_fd(), target) {
            let _ = nix::unistd::close(saved);
            return Err(CaptureError::Redirect {
                target: label.to_string(),
                source,
            });
        }
        Ok((saved, read_end, write_end))
    }

    /// Name of the captured stream or descriptor
    pub fn label(&self) -> &str {
        &self.label
    }

    /// End the scope and return everything written during it.
    pub fn end(mut self) -> Vec<u8> {
        self.finish()
    }

    /// Restore the original descriptor exactly once and collect the bytes.
    ///
    /// Every step runs even if an earlier one failed. Problems are logged
    /// only after the original descriptor is back in place, since the log
    /// may itself be going to the captured stream.
    fn finish(&mut self) -> Vec<u8> {
        let mut problems: Vec<String> = Vec::new();
        fdio::flush_all();

        let mut restored = true;
        if let Some(saved) = self.saved.take() {
            if let Err(e) = fdio::redirect(saved, self.target) {
                restored = false;
                problems.push(format!("restore failed: {}", e));
            }
            if let Err(e) = nix::unistd::close(saved) {
                problems.push(format!("closing saved descriptor failed: {}", e));
            }
        }

        drop(self.write_end.take());

        let bytes = match self.read_end.take() {
            Some(read_end) => {
                let (bytes, err) = if restored {
                    fdio::drain(read_end)
                } else {
                    fdio::drain_available(read_end)
                };
                if let Some(e) = err {
                    problems.push(format!("reading pipe failed: {}", e));
                }
                bytes
            }
            None => Vec::new(),
        };

        ACTIVE.lock().remove(&self.target);

        for problem in &problems {
            tracing::warn!(stream = %self.label, "{}", problem);
        }
        tracing::debug!(stream = %self.label, bytes = bytes.len(), "capture ended");
        bytes
    }

    fn is_open(&self) -> bool {
        self.saved.is_some() || self.read_end.is_some() || self.write_end.is_some()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.is_open() {
            let discarded = self.finish();
            tracing::debug!(
                stream = %self.label,
                bytes = discarded.len(),
                "capture dropped without end, output discarded"
            );
        }
    }
}

/// A closure's return value together with the bytes it wrote
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captured<T> {
    pub value: T,
    pub bytes: Vec<u8>,
}

impl<T> Captured<T> {
    /// Captured bytes as text, replacing invalid UTF-8
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Run `f` with `stream` captured.
///
/// The stream is restored even if `f` unwinds.
pub fn capture<T, F>(stream: StdStream, f: F) -> Result<Captured<T>, CaptureError>
where
    F: FnOnce() -> T,
{
    let session = CaptureSession::begin(stream)?;
    let value = f();
    Ok(Captured {
        value,
        bytes: session.end(),
    })
}

/// Run `f` with descriptor `fd` captured.
pub fn capture_raw<T, F>(fd: RawFd, f: F) -> Result<Captured<T>, CaptureError>
where
    F: FnOnce() -> T,
{
    let session = CaptureSession::begin_raw(fd)?;
    let value = f();
    Ok(Captured {
        value,
        bytes: session.end(),
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
