// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Non-terminating checks.
//!
//! A failed check is recorded and execution continues, so every check in
//! a case is evaluated even after an earlier one fails. The `require`
//! family records the same way but also hands back an [`Interrupt`] so
//! the case can stop with `?`.

use crate::diff;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use thiserror::Error;

/// Process exit codes reported by a run
pub mod exit_codes {
    /// Every check passed
    pub const SUCCESS: i32 = 0;
    /// At least one check failed
    pub const FAILURE: i32 = 1;
}

/// Source position of a check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    /// Position of the caller, following `#[track_caller]` frames
    #[track_caller]
    pub fn caller() -> Self {
        std::panic::Location::caller().into()
    }
}

impl From<&std::panic::Location<'_>> for Location {
    fn from(loc: &std::panic::Location<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Outcome of one check
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub passed: bool,
    /// Description supplied by the test author
    pub message: String,
    /// Rendered actual/expected values, present on failed comparisons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub location: Location,
    /// Case that was running when the check was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
}

impl fmt::Display for AssertionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "{}", status)?;
        if let Some(ref case) = self.case {
            write!(f, " {}", case)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(ref detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        write!(f, " ({})", self.location)
    }
}

/// Why a case body stopped before its end
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interrupt {
    /// A `require` check failed; the failure is already recorded
    #[error("requirement failed")]
    RequirementFailed,

    /// The body chose not to run its checks
    #[error("skipped: {0}")]
    Skip(String),

    /// Fixture or harness setup failed
    #[error("harness error: {0}")]
    Harness(String),
}

impl Interrupt {
    pub fn skip(reason: impl Into<String>) -> Self {
        Interrupt::Skip(reason.into())
    }

    pub fn harness(message: impl fmt::Display) -> Self {
        Interrupt::Harness(message.to_string())
    }
}

impl From<testbed_capture::CaptureError> for Interrupt {
    fn from(e: testbed_capture::CaptureError) -> Self {
        Interrupt::harness(format_args!("output capture: {}", e))
    }
}

impl From<testbed_intercept::InterceptError> for Interrupt {
    fn from(e: testbed_intercept::InterceptError) -> Self {
        Interrupt::harness(format_args!("interception: {}", e))
    }
}

impl From<std::io::Error> for Interrupt {
    fn from(e: std::io::Error) -> Self {
        Interrupt::harness(format_args!("I/O: {}", e))
    }
}

/// Read-only snapshot of a recorder
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub failed: usize,
    pub results: Vec<AssertionResult>,
}

impl Summary {
    pub fn passed(&self) -> usize {
        self.total - self.failed
    }

    /// Failed results in evaluation order
    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        }
    }
}

/// Accumulates check outcomes for a whole run
#[derive(Debug, Default)]
pub struct Recorder {
    results: Vec<AssertionResult>,
    failed: usize,
    case: Option<String>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, passed: bool, message: String, detail: Option<String>, location: Location) {
        if !passed {
            self.failed += 1;
            tracing::debug!(case = ?self.case, %location, "check failed: {}", message);
        }
        self.results.push(AssertionResult {
            passed,
            message,
            detail,
            location,
            case: self.case.clone(),
        });
    }

    /// Record `condition`; returns it so callers can branch on the outcome.
    #[track_caller]
    pub fn check(&mut self, condition: bool, description: impl Into<String>) -> bool {
        self.push(condition, description.into(), None, Location::caller());
        condition
    }

    #[track_caller]
    pub fn check_false(&mut self, condition: bool, description: impl Into<String>) -> bool {
        self.check(!condition, description)
    }

    /// Value equality; the failure detail shows both sides.
    #[track_caller]
    pub fn check_eq<A, E>(&mut self, actual: A, expected: E, description: impl Into<String>) -> bool
    where
        A: PartialEq<E> + Debug,
        E: Debug,
    {
        let passed = actual == expected;
        let detail = (!passed).then(|| format!("expected {:?}, got {:?}", expected, actual));
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    #[track_caller]
    pub fn check_ne<A, E>(&mut self, actual: A, unexpected: E, description: impl Into<String>) -> bool
    where
        A: PartialEq<E> + Debug,
        E: Debug,
    {
        let passed = actual != unexpected;
        let detail = (!passed).then(|| format!("expected anything but {:?}", unexpected));
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    /// Floating-point comparison within an absolute tolerance. NaN never passes.
    #[track_caller]
    pub fn check_near(
        &mut self,
        actual: f64,
        expected: f64,
        tolerance: f64,
        description: impl Into<String>,
    ) -> bool {
        let passed = (actual - expected).abs() <= tolerance;
        let detail = (!passed).then(|| {
            format!(
                "expected {} within {}, got {} (off by {})",
                expected,
                tolerance,
                actual,
                (actual - expected).abs()
            )
        });
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    #[track_caller]
    pub fn check_some<T>(&mut self, value: &Option<T>, description: impl Into<String>) -> bool {
        let passed = value.is_some();
        let detail = (!passed).then(|| "expected a value, got None".to_string());
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    #[track_caller]
    pub fn check_none<T: Debug>(&mut self, value: &Option<T>, description: impl Into<String>) -> bool {
        let detail = value.as_ref().map(|v| format!("expected None, got Some({:?})", v));
        let passed = detail.is_none();
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    #[track_caller]
    pub fn check_ok<T, E: Debug>(&mut self, value: &Result<T, E>, description: impl Into<String>) -> bool {
        let detail = value.as_ref().err().map(|e| format!("expected Ok, got Err({:?})", e));
        let passed = detail.is_none();
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    #[track_caller]
    pub fn check_err<T: Debug, E>(&mut self, value: &Result<T, E>, description: impl Into<String>) -> bool {
        let detail = value.as_ref().ok().map(|v| format!("expected Err, got Ok({:?})", v));
        let passed = detail.is_none();
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    /// Substring containment
    #[track_caller]
    pub fn check_contains(&mut self, haystack: &str, needle: &str, description: impl Into<String>) -> bool {
        let passed = haystack.contains(needle);
        let detail = (!passed).then(|| format!("{:?} not found in {:?}", needle, haystack));
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    /// Identity of opaque handles: compares addresses, never pointees.
    #[track_caller]
    pub fn check_ptr_eq<T: ?Sized>(
        &mut self,
        actual: *const T,
        expected: *const T,
        description: impl Into<String>,
    ) -> bool {
        let (a, e) = (actual.cast::<()>(), expected.cast::<()>());
        let passed = a == e;
        let detail = (!passed).then(|| format!("expected handle {:p}, got {:p}", e, a));
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    /// Text equality; a failure carries a line diff of the two texts.
    #[track_caller]
    pub fn check_text_eq(&mut self, actual: &str, expected: &str, description: impl Into<String>) -> bool {
        let passed = actual == expected;
        let detail = (!passed).then(|| diff::render(expected, actual));
        self.push(passed, description.into(), detail, Location::caller());
        passed
    }

    /// Like [`check`](Self::check), but a failure also stops the case.
    #[track_caller]
    pub fn require(&mut self, condition: bool, description: impl Into<String>) -> Result<(), Interrupt> {
        if self.check(condition, description) {
            Ok(())
        } else {
            Err(Interrupt::RequirementFailed)
        }
    }

    #[track_caller]
    pub fn require_eq<A, E>(
        &mut self,
        actual: A,
        expected: E,
        description: impl Into<String>,
    ) -> Result<(), Interrupt>
    where
        A: PartialEq<E> + Debug,
        E: Debug,
    {
        if self.check_eq(actual, expected, description) {
            Ok(())
        } else {
            Err(Interrupt::RequirementFailed)
        }
    }

    /// Unwrap a value the rest of the case depends on.
    #[track_caller]
    pub fn require_some<T>(&mut self, value: Option<T>, description: impl Into<String>) -> Result<T, Interrupt> {
        self.check_some(&value, description);
        value.ok_or(Interrupt::RequirementFailed)
    }

    /// Record a failure that did not come from a comparison.
    pub fn fail_at(&mut self, message: impl Into<String>, detail: Option<String>, location: Location) {
        self.push(false, message.into(), detail, location);
    }

    /// Total number of checks made so far
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of failed checks so far
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Name of the case currently attributed to new checks
    pub fn current_case(&self) -> Option<&str> {
        self.case.as_deref()
    }

    pub(crate) fn enter_case(&mut self, name: &str) {
        self.case = Some(name.to_string());
    }

    pub(crate) fn leave_case(&mut self) {
        self.case = None;
    }

    /// Append results produced elsewhere (e.g. by an isolated child).
    pub(crate) fn absorb(&mut self, results: Vec<AssertionResult>) {
        self.failed += results.iter().filter(|r| !r.passed).count();
        self.results.extend(results);
    }

    /// Results recorded from index `start` on
    pub(crate) fn results_since(&self, start: usize) -> &[AssertionResult] {
        self.results.get(start..).unwrap_or(&[])
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.results.len(),
            failed: self.failed,
            results: self.results.clone(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            exit_codes::SUCCESS
        } else {
            exit_codes::FAILURE
        }
    }
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
