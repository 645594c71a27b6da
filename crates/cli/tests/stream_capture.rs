// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Capture of the process's real stdout and stderr.
//!
//! Runs without libtest so nothing else writes to the streams while a
//! capture is open.

mod common;

use std::io::{self, Write};
use testbed::capture::{capture, CaptureError, CaptureSession, StdStream};
use testbed::{CaseResult, HarnessConfig, Interrupt, Runner, TestCase};

fn stream_cases(stream: StdStream) -> Vec<TestCase> {
    let write = move |bytes: &[u8]| match stream {
        StdStream::Stdout => io::stdout().write_all(bytes).unwrap(),
        StdStream::Stderr => io::stderr().write_all(bytes).unwrap(),
    };

    vec![
        TestCase::new(format!("{} round trip", stream), move |rec| -> CaseResult {
            let captured = capture(stream, || write(b"hello\n"))?;
            rec.check_eq(captured.bytes, b"hello\n".to_vec(), "byte-exact capture");
            Ok(())
        }),
        TestCase::new(format!("{} usable after end", stream), move |rec| -> CaseResult {
            let session = CaptureSession::begin(stream)?;
            write(b"inside\n");
            let inside = session.end();
            let uncaptured = match stream {
                StdStream::Stdout => io::stdout().write_all(b"\n"),
                StdStream::Stderr => io::stderr().write_all(b"\n"),
            };
            let after = capture(stream, || ())?;
            rec.check_eq(inside, b"inside\n".to_vec(), "captured inside scope");
            rec.check_ok(&uncaptured, "ordinary write after end");
            rec.check(after.bytes.is_empty(), "nothing leaks into a later capture");
            Ok(())
        }),
        TestCase::new(format!("{} successive captures", stream), move |rec| -> CaseResult {
            let first = capture(stream, || write(b"first\n"))?;
            let second = capture(stream, || write(b"second\n"))?;
            rec.check_text_eq(&first.text(), "first\n", "first buffer");
            rec.check_text_eq(&second.text(), "second\n", "second buffer");
            Ok(())
        }),
        TestCase::new(format!("{} nested capture rejected", stream), move |rec| -> CaseResult {
            let outer = CaptureSession::begin(stream)?;
            let inner = CaptureSession::begin(stream);
            let rejected = matches!(inner, Err(CaptureError::AlreadyActive(_)));
            drop(inner);
            outer.end();
            rec.check(rejected, "second capture on the same stream fails");
            Ok(())
        }),
        TestCase::new(format!("{} restored after early exit", stream), move |rec| -> CaseResult {
            fn bail(stream: StdStream) -> Result<(), CaptureError> {
                let _session = CaptureSession::begin(stream)?;
                Err(CaptureError::AlreadyActive("simulated".to_string()))
            }
            let early = bail(stream);
            rec.check(early.is_err(), "scope left through an error");
            let again = capture(stream, || write(b"again\n"))?;
            rec.check_text_eq(&again.text(), "again\n", "capture works after early exit");
            Ok(())
        }),
    ]
}

fn main() {
    let mut cases = stream_cases(StdStream::Stdout);
    cases.extend(stream_cases(StdStream::Stderr));

    cases.push(TestCase::new("both streams at once", |rec| -> CaseResult {
        let out = CaptureSession::begin(StdStream::Stdout)?;
        let err = CaptureSession::begin(StdStream::Stderr)?;
        io::stdout().write_all(b"to stdout\n")?;
        io::stderr().write_all(b"to stderr\n")?;
        let err_bytes = err.end();
        let out_bytes = out.end();
        rec.check_eq(out_bytes, b"to stdout\n".to_vec(), "stdout kept apart");
        rec.check_eq(err_bytes, b"to stderr\n".to_vec(), "stderr kept apart");
        Ok(())
    }));

    cases.push(TestCase::new("buffered print is flushed into capture", |rec| -> CaseResult {
        let captured = capture(StdStream::Stdout, || {
            print!("no newline yet");
        })?;
        rec.check_text_eq(&captured.text(), "no newline yet", "partial line captured");
        Ok(())
    }));

    cases.push(TestCase::new("C stdio is flushed into capture", |rec| -> CaseResult {
        let captured = capture(StdStream::Stdout, || {
            // SAFETY: a NUL-terminated literal passed to puts.
            #[allow(unsafe_code)]
            let _ = unsafe { libc::puts(b"from C\0".as_ptr().cast()) };
        })?;
        rec.check_text_eq(&captured.text(), "from C\n", "libc output captured");
        Ok(())
    }));

    cases.push(TestCase::new("unusable log file warns on stderr", |rec| -> CaseResult {
        let dir = tempfile::tempdir()?;
        let mut config = HarnessConfig::default();
        config.log.file = Some(dir.path().join("missing").join("run.log"));
        let runner = Runner::new(config).map_err(Interrupt::harness)?;

        let out = capture(StdStream::Stdout, || {
            capture(StdStream::Stderr, || runner.run(Vec::new()))
        })?;
        let report = out.text().into_owned();
        let err = out.value?;
        rec.check_eq(err.value, 0, "empty run still succeeds");
        rec.check_contains(&err.text(), "Warning: logging disabled", "warning printed");
        rec.check_contains(&report, "Tests run: 0", "report still printed");
        Ok(())
    }));

    std::process::exit(Runner::new(common::verbose("stream capture")).unwrap().run(cases));
}
