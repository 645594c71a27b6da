// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run reports and their text/JSON rendering.

use crate::check::{AssertionResult, Summary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

/// Runner lifecycle; a runner executes once
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "case", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotStarted,
    /// Index of the case being executed
    Running(usize),
    Completed,
}

/// How one case ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed,
    Skipped(String),
    /// The case's process died; only under subprocess isolation
    Crashed(String),
    /// Excluded by the name filter
    Filtered,
    /// Not reached because fail-fast stopped the run
    NotRun,
}

impl CaseOutcome {
    /// Whether the case body was executed
    pub fn ran(&self) -> bool {
        !matches!(self, CaseOutcome::Filtered | CaseOutcome::NotRun)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CaseOutcome::Failed | CaseOutcome::Crashed(_))
    }
}

/// Per-case entry in a [`RunReport`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub name: String,
    pub outcome: CaseOutcome,
    /// Checks recorded by this case
    pub checks: usize,
    /// Failed checks recorded by this case
    pub failures: usize,
    pub duration_ms: u64,
}

/// Structured result of a whole run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub state: RunState,
    pub cases: Vec<CaseReport>,
    pub summary: Summary,
    pub exit_code: i32,
}

impl RunReport {
    /// Cases whose body executed
    pub fn cases_run(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.ran()).count()
    }

    /// Cases that failed or crashed
    pub fn cases_failed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_failure()).count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the JSON form to `path`.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json + "\n")
    }

    /// Human-readable form.
    ///
    /// With `verbose`, every case gets a status line; otherwise only
    /// failed checks and the totals are shown.
    pub fn render_text(&self, verbose: bool) -> String {
        let mut out = String::new();

        if verbose {
            if !self.name.is_empty() {
                let _ = writeln!(out, "Running {}", self.name);
            }
            for case in &self.cases {
                let _ = match case.outcome {
                    CaseOutcome::Passed => writeln!(out, "[PASS] {}", case.name),
                    CaseOutcome::Failed => writeln!(
                        out,
                        "[FAIL] {} ({} of {} checks failed)",
                        case.name, case.failures, case.checks
                    ),
                    CaseOutcome::Skipped(ref reason) => {
                        writeln!(out, "[SKIP] {}: {}", case.name, reason)
                    }
                    CaseOutcome::Crashed(ref desc) => writeln!(out, "[CRASH] {}: {}", case.name, desc),
                    CaseOutcome::Filtered | CaseOutcome::NotRun => Ok(()),
                };
            }
        }

        for failure in self.summary.failures() {
            render_failure(&mut out, failure);
        }

        let _ = writeln!(
            out,
            "Tests run: {}, Failures: {}",
            self.cases_run(),
            self.cases_failed()
        );
        let _ = writeln!(
            out,
            "{} / {} checks passed.",
            self.summary.passed(),
            self.summary.total
        );
        out
    }
}

fn render_failure(out: &mut String, failure: &AssertionResult) {
    let _ = match failure.case {
        Some(ref case) => write!(out, "FAIL {}: {}", case, failure.message),
        None => write!(out, "FAIL {}", failure.message),
    };
    let _ = writeln!(out, " ({})", failure.location);
    if let Some(ref detail) = failure.detail {
        for line in detail.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
