// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor helpers for redirection.

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::unistd::{dup2, pipe2};
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

/// Duplicate `fd` into a fresh close-on-exec slot.
pub fn dup_cloexec(fd: RawFd) -> nix::Result<RawFd> {
    fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(0))
}

/// Create a close-on-exec pipe, returning (read end, write end).
pub fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    pipe2(OFlag::O_CLOEXEC)
}

/// Point `target` at whatever `source` refers to, retrying on EINTR.
pub fn redirect(source: RawFd, target: RawFd) -> nix::Result<()> {
    loop {
        match dup2(source, target) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Read until end-of-stream. Bytes read before an error are kept.
pub fn drain(read_end: OwnedFd) -> (Vec<u8>, Option<io::Error>) {
    let mut file = File::from(read_end);
    let mut buf = Vec::new();
    match file.read_to_end(&mut buf) {
        Ok(_) => (buf, None),
        Err(e) => (buf, Some(e)),
    }
}

/// Read whatever is buffered without waiting for end-of-stream.
///
/// Used when the write side could not be detached and a blocking read
/// would never see EOF.
pub fn drain_available(read_end: OwnedFd) -> (Vec<u8>, Option<io::Error>) {
    if let Err(e) = set_non_blocking(read_end.as_raw_fd()) {
        return (Vec::new(), Some(e.into()));
    }
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match nix::unistd::read(read_end.as_raw_fd(), &mut chunk) {
            Ok(0) | Err(Errno::EAGAIN) => return (buf, None),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(Errno::EINTR) => continue,
            Err(e) => return (buf, Some(e.into())),
        }
    }
}

fn set_non_blocking(fd: RawFd) -> nix::Result<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Push buffered bytes for both the Rust handles and C stdio to the OS.
///
/// Call before forking so a child does not inherit pending output.
pub fn flush_all() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: fflush(NULL) only flushes libc's own open output streams and
    // takes no pointer from us.
    #[allow(unsafe_code)]
    let _ = unsafe { libc::fflush(std::ptr::null_mut()) };
}
