// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One forked child per case.
//!
//! The child runs the body against a fresh recorder, catches panics, and
//! writes its results to a pipe as JSON before exiting. The parent reads
//! the pipe to end-of-stream, reaps the child, and turns a signal or a
//! missing report into a crash description.

use crate::case::{CaseResult, TestCase};
use crate::check::{AssertionResult, Recorder};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{ForkResult, Pid};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fs::File;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Exit status of a child that could not deliver its report
const REPORT_FAILED: i32 = 101;

/// Errors that keep a case from being run in a child
#[derive(Debug, Error)]
pub enum IsolationError {
    #[error("failed to create result pipe: {0}")]
    Pipe(#[source] Errno),

    #[error("failed to fork: {0}")]
    Fork(#[source] Errno),

    #[error("failed to reap child {pid}: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: Errno,
    },

    #[error("failed to read child result: {0}")]
    Read(#[from] std::io::Error),
}

/// How the body ended inside the child
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Ending {
    Returned(CaseResult),
    Panicked(String),
}

/// What a child sends back
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChildReport {
    pub results: Vec<AssertionResult>,
    pub ending: Ending,
}

/// Parent's view of a finished child
#[derive(Debug)]
pub(crate) enum ChildExit {
    Reported(ChildReport),
    Crashed(String),
}

/// Run `case` in a forked child and collect what it recorded.
pub(crate) fn run_forked(case: TestCase) -> Result<ChildExit, IsolationError> {
    testbed_capture::flush_standard_streams();
    let (read_end, write_end) = nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(IsolationError::Pipe)?;

    // SAFETY: the runner executes cases on a single thread, so the child
    // starts with no other thread holding locks it might need.
    #[allow(unsafe_code)]
    let forked = unsafe { nix::unistd::fork() };

    match forked.map_err(IsolationError::Fork)? {
        ForkResult::Child => {
            drop(read_end);
            let report = run_child(case);
            let status = match deliver(report, File::from(write_end)) {
                Ok(()) => 0,
                Err(_) => REPORT_FAILED,
            };
            testbed_capture::flush_standard_streams();
            std::process::exit(status)
        }
        ForkResult::Parent { child } => {
            drop(write_end);
            drop(case);
            let mut payload = Vec::new();
            let read = File::from(read_end).read_to_end(&mut payload);
            let status = reap(child)?;
            read?;
            Ok(interpret(status, &payload))
        }
    }
}

fn run_child(case: TestCase) -> ChildReport {
    let mut recorder = Recorder::new();
    recorder.enter_case(case.name());

    let ending = match panic::catch_unwind(AssertUnwindSafe(|| case.run(&mut recorder))) {
        Ok(result) => Ending::Returned(result),
        Err(payload) => Ending::Panicked(panic_message(payload.as_ref())),
    };
    ChildReport {
        results: recorder.summary().results,
        ending,
    }
}

fn deliver(report: ChildReport, mut pipe: File) -> std::io::Result<()> {
    let json = serde_json::to_vec(&report).map_err(std::io::Error::other)?;
    pipe.write_all(&json)
}

fn reap(child: Pid) -> Result<WaitStatus, IsolationError> {
    loop {
        match waitpid(child, None) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => return Ok(status),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(IsolationError::Wait {
                    pid: child.as_raw(),
                    source,
                })
            }
        }
    }
}

/// Map a child's exit status and pipe payload to its outcome.
pub(crate) fn interpret(status: WaitStatus, payload: &[u8]) -> ChildExit {
    match status {
        WaitStatus::Signaled(_, signal, core_dumped) => {
            let suffix = if core_dumped { " (core dumped)" } else { "" };
            ChildExit::Crashed(format!("terminated by {}{}", signal, suffix))
        }
        WaitStatus::Exited(_, 0) => match serde_json::from_slice(payload) {
            Ok(report) => ChildExit::Reported(report),
            Err(e) => ChildExit::Crashed(format!("unreadable result: {}", e)),
        },
        WaitStatus::Exited(_, code) => {
            ChildExit::Crashed(format!("exited with status {} without a result", code))
        }
        other => ChildExit::Crashed(format!("unexpected wait status {:?}", other)),
    }
}

/// Text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "isolation_tests.rs"]
mod tests;
