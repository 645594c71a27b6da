// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Link-time symbol wrapping.
//!
//! With `--wrap=S`, GNU-compatible linkers resolve undefined references to
//! `S` as `__wrap_S` and references to `__real_S` as the original `S`.
//! Both alias names are fixed by the linker, so a `[[wrap]]` entry may
//! spell them out but cannot change them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Prefix the linker gives the original definition
pub const REAL_PREFIX: &str = "__real_";
/// Prefix the linker expects on the substitute
pub const WRAP_PREFIX: &str = "__wrap_";

/// One `[[wrap]]` entry: (original, alias for original, substitute)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapSpec {
    pub symbol: String,

    /// Alias under which the original stays reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real: Option<String>,

    /// Symbol the test supplies in place of the original
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitute: Option<String>,
}

impl WrapSpec {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            real: None,
            substitute: None,
        }
    }

    pub fn real_symbol(&self) -> String {
        self.real
            .clone()
            .unwrap_or_else(|| format!("{}{}", REAL_PREFIX, self.symbol))
    }

    pub fn substitute_symbol(&self) -> String {
        self.substitute
            .clone()
            .unwrap_or_else(|| format!("{}{}", WRAP_PREFIX, self.symbol))
    }

    /// Argument for the compiler driver
    pub fn linker_arg(&self) -> String {
        format!("-Wl,--wrap={}", self.symbol)
    }

    /// Line for a Cargo build script's stdout
    pub fn cargo_directive(&self) -> String {
        format!("cargo:rustc-link-arg={}", self.linker_arg())
    }
}

/// Errors in wrap configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("wrap entry {index} has an empty symbol")]
    EmptySymbol { index: usize },

    #[error("invalid symbol name '{0}'")]
    InvalidSymbol(String),

    #[error("symbol '{0}' is wrapped more than once")]
    DuplicateSymbol(String),

    #[error("{field} alias for '{symbol}' must be '{expected}', found '{found}'")]
    NonCanonical {
        symbol: String,
        field: &'static str,
        expected: String,
        found: String,
    },
}

/// Output form for [`link_args`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArgStyle {
    /// `-Wl,--wrap=S`, for a C compiler driver or `RUSTFLAGS`
    #[default]
    Driver,
    /// `cargo:rustc-link-arg=-Wl,--wrap=S`, printed from `build.rs`
    Cargo,
}

fn is_symbol_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

/// Check every entry and reject duplicates.
pub fn validate(wraps: &[WrapSpec]) -> Result<(), LinkError> {
    let mut seen = HashSet::new();
    for (index, wrap) in wraps.iter().enumerate() {
        if wrap.symbol.is_empty() {
            return Err(LinkError::EmptySymbol { index });
        }
        if !is_symbol_name(&wrap.symbol) {
            return Err(LinkError::InvalidSymbol(wrap.symbol.clone()));
        }
        if !seen.insert(wrap.symbol.as_str()) {
            return Err(LinkError::DuplicateSymbol(wrap.symbol.clone()));
        }

        let aliases = [
            ("real", &wrap.real, REAL_PREFIX),
            ("substitute", &wrap.substitute, WRAP_PREFIX),
        ];
        for (field, given, prefix) in aliases {
            let expected = format!("{}{}", prefix, wrap.symbol);
            if let Some(found) = given {
                if *found != expected {
                    return Err(LinkError::NonCanonical {
                        symbol: wrap.symbol.clone(),
                        field,
                        expected,
                        found: found.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Linker arguments for `wraps`, one per entry in order.
pub fn link_args(wraps: &[WrapSpec], style: ArgStyle) -> Result<Vec<String>, LinkError> {
    validate(wraps)?;
    Ok(wraps
        .iter()
        .map(|w| match style {
            ArgStyle::Driver => w.linker_arg(),
            ArgStyle::Cargo => w.cargo_directive(),
        })
        .collect())
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
