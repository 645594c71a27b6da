// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Call interception for tests.
//!
//! An [`Intercept`] is a named seam the code under test calls instead of
//! calling a dependency directly. Tests install substitutes on it for a
//! bounded scope and read back the [`CallLog`] afterwards.
//!
//! Two strategies are supported:
//!
//! * [`Intercept::wrapping`] keeps the real implementation reachable, so a
//!   substitute may answer some calls and [`Reply::Delegate`] the rest.
//! * [`Intercept::overriding`] replaces the symbol outright; the emulation
//!   must cover every path the test exercises.
//!
//! When the code under test is a prebuilt C object, the same seam sits
//! behind a linker `--wrap`: the object's calls to `foo` resolve to
//! `__wrap_foo`, which forwards to a binding whose real implementation is
//! `__real_foo`.
//!
//! ```ignore
//! static PNG_GET_BIT_DEPTH: LazyLock<Intercept<(usize,), u8>> = LazyLock::new(|| {
//!     Intercept::wrapping("png_get_bit_depth", |(png,)| unsafe { __real_png_get_bit_depth(png) })
//! });
//!
//! #[no_mangle]
//! extern "C" fn __wrap_png_get_bit_depth(png: usize) -> u8 {
//!     PNG_GET_BIT_DEPTH.invoke((png,)).unwrap_or(0)
//! }
//! ```

mod binding;
mod duration_serde;
mod log;
mod record;
mod registry;

pub use binding::{Intercept, InterceptError, Reply, Strategy, SubstituteGuard};
pub use log::CallLog;
pub use record::{Behavior, CallRecord};
pub use registry::{Binding, Registry};
