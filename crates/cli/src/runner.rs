// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential test runner.
//!
//! Cases run one at a time, in the order given, against a single
//! recorder. Under the default in-process isolation a fault in a case
//! body is not caught and ends the whole run.

use crate::case::{CaseResult, TestCase};
use crate::check::{exit_codes, Interrupt, Location, Recorder};
use crate::config::{ConfigError, HarnessConfig, Isolation, ReportFormat};
use crate::diagnostic::print_error;
use crate::isolation::{self, ChildExit, Ending};
use crate::logging;
use crate::report::{CaseOutcome, CaseReport, RunReport, RunState};
use chrono::Utc;
use regex::Regex;
use std::time::Instant;
use testbed_intercept::Registry;

/// Executes a fixed list of cases once
#[derive(Debug)]
pub struct Runner {
    config: HarnessConfig,
    filter: Option<Regex>,
    bindings: Registry,
    recorder: Recorder,
    state: RunState,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            config: HarnessConfig::default(),
            filter: None,
            bindings: Registry::new(),
            recorder: Recorder::new(),
            state: RunState::NotStarted,
        }
    }
}

impl Runner {
    pub fn new(config: HarnessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let filter = config.filter_regex()?;
        Ok(Self {
            config,
            filter,
            ..Self::default()
        })
    }

    /// Runner configured from `TESTBED_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(HarnessConfig::from_env()?)
    }

    /// Bindings to reset after every case
    pub fn with_bindings(mut self, bindings: Registry) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every case, print the report and return the process exit code.
    ///
    /// Installs the configured `[log]` subscriber first unless one is
    /// already set.
    pub fn run(self, cases: Vec<TestCase>) -> i32 {
        logging::init_logging_or_warn(&self.config.log);
        let format = self.config.report.format;
        let verbose = self.config.report.verbose;
        let json_path = self.config.report.json_path.clone();
        let report = self.run_report(cases);

        match format {
            ReportFormat::Text => print!("{}", report.render_text(verbose)),
            ReportFormat::Json => match report.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    print_error(format_args!("failed to render report: {}", e));
                    return exit_codes::FAILURE;
                }
            },
        }

        if let Some(path) = json_path {
            if let Err(e) = report.write_json(&path) {
                print_error(format_args!(
                    "failed to write report to {}: {}",
                    path.display(),
                    e
                ));
                return exit_codes::FAILURE;
            }
        }
        report.exit_code
    }

    /// Run every case and return the structured result without printing.
    pub fn run_report(mut self, cases: Vec<TestCase>) -> RunReport {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(cases.len());
        let mut stopped = false;
        tracing::info!(suite = %self.config.name, cases = cases.len(), "run starting");

        for (index, case) in cases.into_iter().enumerate() {
            let name = case.name().to_string();
            if stopped {
                reports.push(not_executed(name, CaseOutcome::NotRun));
                continue;
            }
            if !self.selected(&name) {
                tracing::debug!(case = %name, "filtered out");
                reports.push(not_executed(name, CaseOutcome::Filtered));
                continue;
            }

            self.state = RunState::Running(index);
            let report = self.execute(case);
            self.bindings.reset_all();

            if report.outcome.is_failure() && self.config.fail_fast {
                tracing::info!(case = %name, "stopping after failure");
                stopped = true;
            }
            reports.push(report);
        }

        self.state = RunState::Completed;
        let summary = self.recorder.summary();
        tracing::info!(
            total = summary.total,
            failed = summary.failed,
            "run completed"
        );
        RunReport {
            name: self.config.name.clone(),
            started_at,
            state: self.state,
            cases: reports,
            exit_code: summary.exit_code(),
            summary,
        }
    }

    fn selected(&self, name: &str) -> bool {
        self.filter.as_ref().map_or(true, |re| re.is_match(name))
    }

    fn execute(&mut self, case: TestCase) -> CaseReport {
        let name = case.name().to_string();
        let location = case.location().clone();
        let first = self.recorder.total();
        let started = Instant::now();
        tracing::debug!(case = %name, "case starting");

        self.recorder.enter_case(&name);
        let outcome = match self.config.isolation {
            Isolation::InProcess => {
                let result = case.run(&mut self.recorder);
                self.settle(result, &location, first)
            }
            Isolation::Subprocess => self.execute_forked(case, &location, first),
        };
        self.recorder.leave_case();

        let recorded = self.recorder.results_since(first);
        let report = CaseReport {
            name,
            checks: recorded.len(),
            failures: recorded.iter().filter(|r| !r.passed).count(),
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::debug!(case = %report.name, outcome = ?report.outcome, "case finished");
        report
    }

    fn execute_forked(&mut self, case: TestCase, location: &Location, first: usize) -> CaseOutcome {
        match isolation::run_forked(case) {
            Ok(ChildExit::Reported(report)) => {
                self.recorder.absorb(report.results);
                match report.ending {
                    Ending::Returned(result) => self.settle(result, location, first),
                    Ending::Panicked(message) => {
                        let description = format!("panicked: {}", message);
                        self.recorder
                            .fail_at("case crashed", Some(description.clone()), location.clone());
                        CaseOutcome::Crashed(description)
                    }
                }
            }
            Ok(ChildExit::Crashed(description)) => {
                self.recorder
                    .fail_at("case crashed", Some(description.clone()), location.clone());
                CaseOutcome::Crashed(description)
            }
            Err(e) => self.settle(Err(Interrupt::harness(e)), location, first),
        }
    }

    /// Decide a case's outcome from its body's result and what it recorded.
    fn settle(&mut self, result: CaseResult, location: &Location, first: usize) -> CaseOutcome {
        let failed_checks = self.recorder.results_since(first).iter().any(|r| !r.passed);
        match result {
            Ok(()) if failed_checks => CaseOutcome::Failed,
            Ok(()) => CaseOutcome::Passed,
            Err(Interrupt::RequirementFailed) => {
                if !failed_checks {
                    self.recorder
                        .fail_at("case stopped by a failed requirement", None, location.clone());
                }
                CaseOutcome::Failed
            }
            Err(Interrupt::Skip(_)) if failed_checks => CaseOutcome::Failed,
            Err(Interrupt::Skip(reason)) => {
                tracing::info!(reason = %reason, "case skipped");
                CaseOutcome::Skipped(reason)
            }
            Err(Interrupt::Harness(message)) => {
                tracing::warn!(location = %location, "harness setup failed: {}", message);
                self.recorder
                    .fail_at("harness setup failed", Some(message), location.clone());
                CaseOutcome::Failed
            }
        }
    }
}

fn not_executed(name: String, outcome: CaseOutcome) -> CaseReport {
    CaseReport {
        name,
        outcome,
        checks: 0,
        failures: 0,
        duration_ms: 0,
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
