// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation log implementation.

use crate::record::{Behavior, CallRecord};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

type JsonlSink<A, R> = Arc<dyn Fn(&CallRecord<A, R>) + Send + Sync>;

/// Ordered log of calls made through one intercepted symbol
pub struct CallLog<A, R> {
    start: Instant,
    calls: Arc<Mutex<Vec<CallRecord<A, R>>>>,
    sink: Option<JsonlSink<A, R>>,
}

impl<A: Clone, R: Clone> CallLog<A, R> {
    /// Create a new in-memory log
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            calls: Arc::new(Mutex::new(Vec::new())),
            sink: None,
        }
    }

    /// Append a call, returning its sequence number
    pub fn record(&self, args: A, behavior: Behavior, ret: Option<R>) -> u64 {
        let mut calls = self.calls.lock();
        let seq = calls.len() as u64;
        let record = CallRecord {
            seq,
            timestamp: SystemTime::now(),
            elapsed: self.start.elapsed(),
            args,
            behavior,
            ret,
        };

        if let Some(ref sink) = self.sink {
            sink(&record);
        }
        calls.push(record);
        seq
    }

    /// Get all recorded calls in call order
    pub fn calls(&self) -> Vec<CallRecord<A, R>> {
        self.calls.lock().clone()
    }

    /// Get only the arguments, in call order
    pub fn args(&self) -> Vec<A> {
        self.calls.lock().iter().map(|c| c.args.clone()).collect()
    }

    /// Get the last N calls
    pub fn last(&self, n: usize) -> Vec<CallRecord<A, R>> {
        let all = self.calls.lock();
        all.iter().rev().take(n).rev().cloned().collect()
    }

    /// Count calls matching a predicate
    pub fn count<F: Fn(&CallRecord<A, R>) -> bool>(&self, pred: F) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Calls answered by a substitute
    pub fn fabricated(&self) -> Vec<CallRecord<A, R>> {
        self.filter_behavior(Behavior::Fabricated)
    }

    /// Calls forwarded to the real implementation
    pub fn delegated(&self) -> Vec<CallRecord<A, R>> {
        self.filter_behavior(Behavior::Delegated)
    }

    fn filter_behavior(&self, behavior: Behavior) -> Vec<CallRecord<A, R>> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.behavior == behavior)
            .cloned()
            .collect()
    }

    /// Get the total number of calls
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if no call was recorded
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Clear all recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl<A, R> CallLog<A, R>
where
    A: Clone + Serialize + 'static,
    R: Clone + Serialize + 'static,
{
    /// Create a log that also appends every call to a file (JSONL format)
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let writer = Mutex::new(BufWriter::new(file));
        let sink: JsonlSink<A, R> = Arc::new(move |record| {
            let mut w = writer.lock();
            match serde_json::to_string(record) {
                Ok(json) => {
                    let _ = writeln!(w, "{}", json);
                    let _ = w.flush();
                }
                Err(e) => tracing::warn!(error = %e, "dropping unserializable call record"),
            }
        });
        Ok(Self {
            sink: Some(sink),
            ..Self::new()
        })
    }
}

impl<A: Clone, R: Clone> Default for CallLog<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for CallLog<A, R> {
    fn clone(&self) -> Self {
        Self {
            start: self.start,
            calls: Arc::clone(&self.calls),
            sink: self.sink.as_ref().map(Arc::clone),
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
