// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Type-erased view over bindings, used for per-case teardown.

use crate::binding::{Intercept, Strategy};
use std::fmt;

/// Operations a runner needs on a binding regardless of its signature
pub trait Binding: Send + Sync {
    /// Symbol name the binding stands in for
    fn symbol(&self) -> &str;

    /// How the binding was established
    fn strategy(&self) -> Strategy;

    /// Number of calls recorded since the last reset
    fn call_count(&self) -> usize;

    /// Remove scoped substitutes and clear the log
    fn reset(&self);
}

impl<A, R> Binding for Intercept<A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    fn symbol(&self) -> &str {
        Intercept::symbol(self)
    }

    fn strategy(&self) -> Strategy {
        Intercept::strategy(self)
    }

    fn call_count(&self) -> usize {
        self.log().len()
    }

    fn reset(&self) {
        Intercept::reset(self)
    }
}

/// An ordered set of bindings keyed by symbol
#[derive(Default)]
pub struct Registry {
    bindings: Vec<Box<dyn Binding>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. A later registration for the same symbol replaces
    /// the earlier one.
    pub fn register<B: Binding + 'static>(&mut self, binding: B) -> &mut Self {
        self.bindings.retain(|b| b.symbol() != binding.symbol());
        self.bindings.push(Box::new(binding));
        self
    }

    /// Look a binding up by symbol
    pub fn get(&self, symbol: &str) -> Option<&dyn Binding> {
        self.bindings
            .iter()
            .find(|b| b.symbol() == symbol)
            .map(|b| b.as_ref())
    }

    /// Reset every binding
    pub fn reset_all(&self) {
        for binding in &self.bindings {
            binding.reset();
        }
    }

    /// Symbols in registration order
    pub fn symbols(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.symbol()).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("symbols", &self.symbols())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
