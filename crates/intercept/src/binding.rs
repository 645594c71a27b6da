// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Intercept bindings: a named seam between the code under test and one
//! of its dependencies.
//!
//! The code under test calls [`Intercept::invoke`] wherever it would have
//! called the dependency directly. With no substitute installed a
//! wrapping binding forwards to the real implementation, so production
//! behavior is unchanged. A test installs a substitute for a bounded
//! scope to observe arguments or to fabricate results.

use crate::log::CallLog;
use crate::record::Behavior;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What a substitute decided for one call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply<R> {
    /// Hand this value back without touching the real implementation
    Fabricate(R),
    /// Forward the call to the real implementation
    Delegate,
}

/// How the binding was established
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The real implementation stays reachable for delegation
    Wrap,
    /// The substitute replaces the symbol outright and must emulate it
    Override,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Wrap => write!(f, "wrap"),
            Strategy::Override => write!(f, "override"),
        }
    }
}

/// Errors raised while resolving an intercepted call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterceptError {
    #[error("substitute for '{symbol}' delegated, but no real implementation is bound")]
    NoRealImplementation { symbol: String },
}

type RealFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;
type SubstituteFn<A, R> = Box<dyn FnMut(&A) -> Reply<R> + Send>;

/// Installed substitutes, innermost last.
///
/// Ids are never reused, so a guard whose entry was cleared by `reset`
/// finds nothing to remove.
struct Slot<A, R> {
    next_id: u64,
    stack: Vec<(u64, SubstituteFn<A, R>)>,
}

impl<A, R> Slot<A, R> {
    fn active(&mut self) -> Option<&mut SubstituteFn<A, R>> {
        self.stack.last_mut().map(|(_, substitute)| substitute)
    }
}

struct Inner<A, R> {
    symbol: String,
    strategy: Strategy,
    real: Option<RealFn<A, R>>,
    slot: Mutex<Slot<A, R>>,
    base: Mutex<Option<SubstituteFn<A, R>>>,
    log: CallLog<A, R>,
}

/// A named interception point for a dependency taking `A` and returning `R`.
///
/// `A` is usually a tuple of the original call's arguments. Clones share
/// the same substitute slot and call log.
pub struct Intercept<A, R> {
    inner: Arc<Inner<A, R>>,
}

impl<A, R> Clone for Intercept<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> Intercept<A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Bind `symbol` with its real implementation reachable for delegation.
    pub fn wrapping<F>(symbol: impl Into<String>, real: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::wrapping_logged(symbol, real, CallLog::new())
    }

    /// Like [`wrapping`](Self::wrapping), recording calls into `log`.
    ///
    /// Pass a [`CallLog::with_file`] log to mirror every call to a JSONL file.
    pub fn wrapping_logged<F>(symbol: impl Into<String>, real: F, log: CallLog<A, R>) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::build(symbol.into(), Strategy::Wrap, Some(Arc::new(real)), None, log)
    }

    /// Bind `symbol` to an emulation that fully replaces it.
    ///
    /// The emulation stays in effect for the whole lifetime of the binding;
    /// scoped substitutes layer on top of it.
    pub fn overriding<F>(symbol: impl Into<String>, emulation: F) -> Self
    where
        F: FnMut(&A) -> R + Send + 'static,
    {
        Self::overriding_logged(symbol, emulation, CallLog::new())
    }

    /// Like [`overriding`](Self::overriding), recording calls into `log`.
    pub fn overriding_logged<F>(symbol: impl Into<String>, mut emulation: F, log: CallLog<A, R>) -> Self
    where
        F: FnMut(&A) -> R + Send + 'static,
    {
        let base: SubstituteFn<A, R> = Box::new(move |args| Reply::Fabricate(emulation(args)));
        Self::build(symbol.into(), Strategy::Override, None, Some(base), log)
    }

    fn build(
        symbol: String,
        strategy: Strategy,
        real: Option<RealFn<A, R>>,
        base: Option<SubstituteFn<A, R>>,
        log: CallLog<A, R>,
    ) -> Self {
        tracing::debug!(symbol = %symbol, %strategy, "intercept bound");
        Self {
            inner: Arc::new(Inner {
                symbol,
                strategy,
                real,
                slot: Mutex::new(Slot {
                    next_id: 0,
                    stack: Vec::new(),
                }),
                base: Mutex::new(base),
                log,
            }),
        }
    }

    /// Route the call through the binding.
    ///
    /// Every call is appended to the log, including calls that could not
    /// be resolved. Substitutes run while the binding's slot is locked, so
    /// a substitute must not call back into the same binding.
    pub fn invoke(&self, args: A) -> Result<R, InterceptError> {
        let reply = self.consult(&args);

        let (behavior, ret) = match reply {
            Reply::Fabricate(value) => (Behavior::Fabricated, value),
            Reply::Delegate => match self.inner.real {
                Some(ref real) => (Behavior::Delegated, real(args.clone())),
                None => {
                    self.inner.log.record(args, Behavior::Unresolved, None);
                    tracing::warn!(symbol = %self.inner.symbol, "delegation without a real implementation");
                    return Err(InterceptError::NoRealImplementation {
                        symbol: self.inner.symbol.clone(),
                    });
                }
            },
        };

        let seq = self.inner.log.record(args, behavior, Some(ret.clone()));
        tracing::trace!(symbol = %self.inner.symbol, seq, ?behavior, "intercepted call");
        Ok(ret)
    }

    fn consult(&self, args: &A) -> Reply<R> {
        let mut slot = self.inner.slot.lock();
        if let Some(substitute) = slot.active() {
            return substitute(args);
        }
        drop(slot);

        let mut base = self.inner.base.lock();
        match base.as_mut() {
            Some(emulation) => emulation(args),
            None => Reply::Delegate,
        }
    }

    /// Install a substitute until the returned guard is dropped.
    ///
    /// Installs nest: the most recently installed substitute still held
    /// by a guard is the active one. Guards may be dropped in any order;
    /// dropping one removes only its own substitute.
    pub fn install<F>(&self, substitute: F) -> SubstituteGuard<A, R>
    where
        F: FnMut(&A) -> Reply<R> + Send + 'static,
    {
        let mut slot = self.inner.slot.lock();
        let id = slot.next_id;
        slot.next_id += 1;
        let nested = !slot.stack.is_empty();
        slot.stack.push((id, Box::new(substitute)));
        tracing::debug!(symbol = %self.inner.symbol, id, nested, "substitute installed");
        SubstituteGuard {
            binding: self.clone(),
            id,
        }
    }

    /// Install a substitute that fabricates `value` for every call.
    pub fn returning(&self, value: R) -> SubstituteGuard<A, R> {
        self.install(move |_| Reply::Fabricate(value.clone()))
    }

    /// Symbol name this binding stands in for
    pub fn symbol(&self) -> &str {
        &self.inner.symbol
    }

    /// How the binding was established
    pub fn strategy(&self) -> Strategy {
        self.inner.strategy
    }

    /// True while a scoped substitute is installed
    pub fn is_substituted(&self) -> bool {
        !self.inner.slot.lock().stack.is_empty()
    }

    /// The binding's invocation log
    pub fn log(&self) -> &CallLog<A, R> {
        &self.inner.log
    }

    /// Drop every scoped substitute and clear the log.
    ///
    /// Outstanding guards become inert. An override's base emulation is kept.
    pub fn reset(&self) {
        self.inner.slot.lock().stack.clear();
        self.inner.log.clear();
    }
}

impl<A, R> fmt::Debug for Intercept<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intercept")
            .field("symbol", &self.inner.symbol)
            .field("strategy", &self.inner.strategy)
            .field("has_real", &self.inner.real.is_some())
            .finish_non_exhaustive()
    }
}

/// Keeps a substitute installed; removes it on drop.
#[must_use = "the substitute is removed as soon as the guard is dropped"]
pub struct SubstituteGuard<A, R> {
    binding: Intercept<A, R>,
    id: u64,
}

impl<A, R> Drop for SubstituteGuard<A, R> {
    fn drop(&mut self) {
        let removed = {
            let mut slot = self.binding.inner.slot.lock();
            let index = slot.stack.iter().rposition(|(id, _)| *id == self.id);
            index.map(|index| slot.stack.remove(index))
        };
        // Dropped outside the lock.
        drop(removed);
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
