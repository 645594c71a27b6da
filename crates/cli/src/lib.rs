// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for exercising C libraries and other code with side effects.
//!
//! A suite is a list of named [`TestCase`]s run in order by a [`Runner`]
//! against one [`Recorder`]. Checks never stop a case; the recorder keeps
//! every outcome and the runner turns them into a report and an exit code.
//!
//! ```no_run
//! use testbed::{Runner, TestCase};
//! use testbed::capture::{capture, StdStream};
//!
//! fn main() {
//!     let cases = vec![
//!         TestCase::new("arith", |rec| {
//!             rec.check_eq(2 + 2, 4, "addition");
//!         }),
//!         TestCase::new("banner", |rec| -> Result<(), testbed::Interrupt> {
//!             let out = capture(StdStream::Stdout, || println!("ready"))?;
//!             rec.check_text_eq(&out.text(), "ready\n", "banner text");
//!             Ok(())
//!         }),
//!     ];
//!     std::process::exit(Runner::default().run(cases));
//! }
//! ```
//!
//! Output capture and call interception live in their own crates and are
//! re-exported as [`capture`] and [`intercept`].

pub mod case;
pub mod check;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod diff;
mod isolation;
pub mod link;
pub mod logging;
pub mod report;
pub mod runner;

/// Scoped capture of stdout/stderr
pub mod capture {
    pub use testbed_capture::{
        capture, capture_raw, flush_standard_streams, CaptureError, CaptureSession, Captured,
        StdStream,
    };
}

/// Call interception seams
pub mod intercept {
    pub use testbed_intercept::{
        Behavior, Binding, CallLog, CallRecord, Intercept, InterceptError, Registry, Reply, Strategy,
        SubstituteGuard,
    };
}

pub use case::{CaseResult, TestCase};
pub use check::{exit_codes, AssertionResult, Interrupt, Location, Recorder, Summary};
pub use config::{HarnessConfig, Isolation};
pub use isolation::IsolationError;
pub use report::{CaseOutcome, RunReport, RunState};
pub use runner::Runner;
