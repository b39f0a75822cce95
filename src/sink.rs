// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::log_record::LogRecord;
use std::fmt::Debug;
use std::io;

/// Which representation of a record a sink consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SinkMode {
    /// Newline-terminated JSON bytes.
    #[default]
    Bytes,
    /// The structured [LogRecord] itself; nothing is serialized for this sink.
    Record,
}

/**
A destination for log events.

Sinks are owned by the application.  fanlog holds `Arc`s to them for as long as they are
registered and never creates, closes or flushes them on its own.

A sink that is shared between threads must serialize its own writes; fanlog does not order
writes from different log calls.
*/
pub trait Sink: Debug + Send + Sync {
    /**
    The representation this sink wants.

    Must not change while the sink is registered.
    */
    fn mode(&self) -> SinkMode {
        SinkMode::Bytes
    }

    /**
    Writes one serialized record.  `line` ends with `\n` and contains no other newline.

    Errors are counted by the registry and otherwise dropped.
    */
    fn write_line(&self, line: &[u8]) -> io::Result<()>;

    /**
    Writes one structured record.  Only called when [Self::mode] is [SinkMode::Record].

    The default returns [io::ErrorKind::Unsupported].  The dispatcher then passes the call's
    shared line to [Self::write_line] instead, so a record-mode sink without its own
    `write_record` still causes no serialization of its own.
    */
    fn write_record(&self, _record: &LogRecord) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }

    /**
    The application may imminently exit.  Ensure all buffers are flushed.
    */
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/*
Boilerplate notes.

# Sink

Clone makes no sense on a trait object; sinks are shared through Arc.
PartialEq is possible but ambiguous between data equality and identity.  The registry uses
Arc::ptr_eq where it needs identity.
Default is not sensible since a sink usually needs somewhere to write to.
Send/Sync are required because one registry serves every thread.

# SinkMode

Default is Bytes, which is what plain writers want.
*/
