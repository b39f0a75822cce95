// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides an in-memory sink for testing and debugging purposes.
//! The `InMemorySink` captures events in memory rather than writing them anywhere, making it
//! ideal for:
//!
//! - Unit testing code that logs through fanlog
//! - Programmatically examining log output
//! - Capturing logs in environments where stderr is redirected or unavailable
//!
//! ## Modes
//!
//! An `InMemorySink` is either a bytes sink ([`InMemorySink::new`]), which stores the serialized
//! lines exactly as a file or pipe would receive them, or a record sink
//! ([`InMemorySink::records`]), which stores the structured records and never causes any
//! serialization.

use crate::log_record::LogRecord;
use crate::sink::{Sink, SinkMode};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An in-memory sink.
///
/// # Example
///
/// ```rust
/// use fanlog::{InMemorySink, Registry, Level};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let sink = Arc::new(InMemorySink::new());
/// registry.register_level(Level::Debug, sink.clone());
///
/// registry.logger("simple").debug(serde_json::json!({"aDebug": "object"}));
///
/// let logs = sink.drain_logs();
/// assert!(logs.contains(r#""aDebug":"object""#));
/// // Buffer is now empty
/// assert_eq!(sink.drain_logs(), "");
/// ```
#[derive(Debug)]
pub struct InMemorySink {
    mode: SinkMode,
    lines: Mutex<Vec<String>>,
    records: Mutex<Vec<LogRecord>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived for diagnostic purposes and required by Sink
// - Default: bytes mode, empty buffers
// - Clone: NOT implemented - a clone would silently split the captured stream
// - PartialEq/Eq/Hash: NOT implemented - mutex state comparison is problematic
// - Send/Sync: Automatically implemented due to Mutex usage (required for Sink)

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

/// A sink that panicked mid-write must not hide everything captured before it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemorySink {
    /// A bytes-mode sink capturing serialized lines.
    pub fn new() -> Self {
        Self::with_mode(SinkMode::Bytes)
    }

    /// A record-mode sink capturing structured records.
    pub fn records() -> Self {
        Self::with_mode(SinkMode::Record)
    }

    pub fn with_mode(mode: SinkMode) -> Self {
        Self {
            mode,
            lines: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Number of events captured and not yet drained.
    pub fn len(&self) -> usize {
        match self.mode {
            SinkMode::Bytes => lock(&self.lines).len(),
            SinkMode::Record => lock(&self.records).len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains captured lines, without their trailing newlines.  Record-mode sinks return their
    /// records serialized.
    pub fn drain_lines(&self) -> Vec<String> {
        let mut lines = std::mem::take(&mut *lock(&self.lines));
        lines.extend(
            std::mem::take(&mut *lock(&self.records))
                .iter()
                .map(LogRecord::to_string),
        );
        lines
    }

    /// Drains everything as one string, one event per line.
    pub fn drain_logs(&self) -> String {
        self.drain_lines().join("\n")
    }

    /// Drains captured records.  Bytes-mode sinks parse their lines back.
    pub fn drain_records(&self) -> Vec<LogRecord> {
        let mut records = std::mem::take(&mut *lock(&self.records));
        records.extend(
            std::mem::take(&mut *lock(&self.lines))
                .iter()
                .filter_map(|line| LogRecord::parse_line(line.as_bytes())),
        );
        records
    }
}

impl Sink for InMemorySink {
    fn mode(&self) -> SinkMode {
        self.mode
    }

    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = String::from_utf8(line.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        lock(&self.lines).push(line);
        Ok(())
    }

    fn write_record(&self, record: &LogRecord) -> io::Result<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }
}
