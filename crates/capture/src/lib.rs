// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped capture of process output streams.
//!
//! Redirects the descriptor behind stdout or stderr into a pipe for the
//! duration of a scope and hands back the bytes written meanwhile. This
//! sees output from any code in the process, including C code writing
//! through its own stdio buffers.
//!
//! Descriptors are process-global: at most one capture may be open per
//! stream, and other threads writing to the stream during the scope are
//! captured too.

mod fdio;
mod session;
mod stream;

pub use fdio::flush_all as flush_standard_streams;
pub use session::{capture, capture_raw, CaptureError, CaptureSession, Captured};
pub use stream::StdStream;
