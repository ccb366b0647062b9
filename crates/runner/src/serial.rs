// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serial test protocol.
//!
//! A sketch under test prints line-delimited JSON messages at 9600 baud:
//! a plan declaration (`{"plan":n}`, negative for an uncounted plan), one
//! result per check (`{"result":bool,"expr":...,"file":...,"line":...}`),
//! and a terminator (`{"done":true}` or a fatal result). Non-JSON lines
//! are ignored. Five seconds of silence is treated as end of stream.

use crate::exec::{ExecError, OutputSink};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::time::Duration;

pub const BAUD_RATE: u32 = 9600;
/// Per-line read timeout; expiry ends the stream for that device.
pub const LINE_TIMEOUT: Duration = Duration::from_secs(5);

/// One message from a device under test.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestMsg {
    pub plan: i32,
    pub result: bool,
    pub expr: String,
    pub file: String,
    pub line: i32,
    pub fatal: bool,
    pub done: bool,
}

/// What one fed line amounted to.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    /// Not a protocol line.
    Ignored,
    /// Produced an output line; keep reading.
    Line(String),
    /// Stream over (done, fatal, or a protocol violation).
    Done(Option<String>),
}

/// Per-sketch protocol state: plan declaration, check counts, violations.
#[derive(Debug, Default)]
pub struct SketchStream {
    plan_declared: bool,
    planned: i32,
    total: i32,
    failed: i32,
    violated: bool,
}

impl SketchStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line from the device.
    ///
    /// A malformed JSON protocol line is an execution error (fatal to the
    /// runner loop), matching the driver contract.
    pub fn feed(&mut self, raw: &[u8]) -> Result<Parsed, ExecError> {
        if raw.first() != Some(&b'{') {
            return Ok(Parsed::Ignored);
        }
        let msg: TestMsg = serde_json::from_slice(raw)?;

        if msg.plan != 0 {
            if self.plan_declared {
                self.violated = true;
                return Ok(Parsed::Done(Some(
                    "Error: duplicate TEST_PLAN() directive\n".to_string(),
                )));
            }
            self.plan_declared = true;
            self.planned = msg.plan;
            return Ok(Parsed::Ignored);
        }

        if !msg.expr.is_empty() {
            if !self.plan_declared {
                self.violated = true;
                return Ok(Parsed::Done(Some(
                    "Error: no test plan declared\n".to_string(),
                )));
            }
            self.total += 1;
            let line = if msg.result {
                format!("PASS: {}:{}: {}\n", msg.file, msg.line, msg.expr)
            } else {
                self.failed += 1;
                format!("FAIL: {}:{}: {}\n", msg.file, msg.line, msg.expr)
            };
            if msg.done || msg.fatal {
                return Ok(Parsed::Done(Some(line)));
            }
            return Ok(Parsed::Line(line));
        }

        if msg.done || msg.fatal {
            return Ok(Parsed::Done(None));
        }
        Ok(Parsed::Ignored)
    }

    /// Close the stream; reports a planned-vs-run mismatch if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.planned > 0 && self.planned != self.total {
            self.violated = true;
            return Some(format!(
                "Error: expected {} tests but run {}\n",
                self.planned, self.total
            ));
        }
        None
    }

    /// Whether the sketch failed: any failed check or protocol violation.
    pub fn failed(&self) -> bool {
        self.failed > 0 || self.violated
    }
}

/// Open `port` and drive the protocol until the stream ends.
/// Returns whether the sketch failed. Blocking; run on a blocking task.
pub fn read_stream(port: &str, sink: &OutputSink) -> Result<bool, ExecError> {
    sink.line(format!("Connecting to {port}\n"));
    let serial = serialport::new(port, BAUD_RATE)
        .timeout(LINE_TIMEOUT)
        .open()
        .map_err(|source| ExecError::Serial {
            port: port.to_string(),
            source,
        })?;

    let mut reader = BufReader::with_capacity(256, serial);
    let mut stream = SketchStream::new();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            // Silence past the line timeout is end-of-stream for this device.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
            Err(e) => return Err(e.into()),
        }
        match stream.feed(&raw)? {
            Parsed::Ignored => {}
            Parsed::Line(text) => sink.line(text),
            Parsed::Done(text) => {
                if let Some(text) = text {
                    sink.line(text);
                }
                break;
            }
        }
    }
    if let Some(text) = stream.finish() {
        sink.line(text);
    }

    let failed = stream.failed();
    sink.line(format!(
        "Test result: {}\n",
        if failed { "failure" } else { "success" }
    ));
    Ok(failed)
}

#[cfg(test)]
#[path = "serial_tests.rs"]
mod tests;
