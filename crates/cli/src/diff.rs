// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line diffs for failed text comparisons.

use similar::TextDiff;

/// Lines of context kept around each changed hunk
const CONTEXT_LINES: usize = 2;

/// Render a unified diff from `expected` to `actual`.
pub fn render(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = diff
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header("expected", "actual")
        .to_string();
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
