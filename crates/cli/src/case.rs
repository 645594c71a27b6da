// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Named test cases.

use crate::check::{Interrupt, Location, Recorder};
use std::fmt;

/// What a case body hands back to the runner
pub type CaseResult = Result<(), Interrupt>;

/// Return types accepted from a case body
pub trait IntoCaseResult {
    fn into_case_result(self) -> CaseResult;
}

impl IntoCaseResult for () {
    fn into_case_result(self) -> CaseResult {
        Ok(())
    }
}

impl<E: Into<Interrupt>> IntoCaseResult for Result<(), E> {
    fn into_case_result(self) -> CaseResult {
        self.map_err(Into::into)
    }
}

type Body = Box<dyn FnOnce(&mut Recorder) -> CaseResult>;

/// A named body run once against the shared recorder
pub struct TestCase {
    name: String,
    location: Location,
    body: Body,
}

impl TestCase {
    /// Create a case. The body may return `()` or a `Result` whose error
    /// converts into [`Interrupt`], so `?` works on harness errors.
    ///
    /// A body that never returns (it panics, aborts or exits, as crash
    /// cases under subprocess isolation do) needs an explicit return type
    /// such as `|rec| -> CaseResult { ... }`.
    #[track_caller]
    pub fn new<F, R>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(&mut Recorder) -> R + 'static,
        R: IntoCaseResult,
    {
        Self {
            name: name.into(),
            location: Location::caller(),
            body: Box::new(move |rec| body(rec).into_case_result()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the case was defined; harness failures are reported here.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub(crate) fn run(self, recorder: &mut Recorder) -> CaseResult {
        (self.body)(recorder)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "case_tests.rs"]
mod tests;
