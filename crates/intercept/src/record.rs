// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recorded call data types.

use super::duration_serde;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One invocation of an intercepted symbol
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRecord<A, R> {
    /// Position in the binding's call order, starting at 0
    pub seq: u64,

    /// Wall-clock timestamp
    pub timestamp: SystemTime,

    /// Elapsed time since the log was created
    #[serde(rename = "elapsed_us", with = "duration_serde")]
    pub elapsed: Duration,

    /// Arguments the code under test passed
    pub args: A,

    /// How the call was resolved
    pub behavior: Behavior,

    /// Value handed back to the code under test (`None` when unresolved)
    pub ret: Option<R>,
}

/// How an intercepted call was resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// The substitute produced the return value itself
    Fabricated,
    /// The call was forwarded to the real implementation
    Delegated,
    /// The substitute asked to delegate but no real implementation exists
    Unresolved,
}

impl<A, R> CallRecord<A, R> {
    /// True if the call reached the real implementation
    pub fn is_delegated(&self) -> bool {
        self.behavior == Behavior::Delegated
    }

    /// True if the substitute answered without the real implementation
    pub fn is_fabricated(&self) -> bool {
        self.behavior == Behavior::Fabricated
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
