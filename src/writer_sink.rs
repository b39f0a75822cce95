// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::sink::Sink;
use std::fmt::Debug;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/**
A bytes sink over any [Write]r: a file, a socket, a pipe, a `Vec<u8>`.

Writes are serialized by an internal mutex, so one `WriterSink` can serve every thread.

```
use fanlog::{WriterSink, Registry, Level};
use std::sync::Arc;

let registry = Arc::new(Registry::new());
let sink = Arc::new(WriterSink::new(Vec::new()));
registry.register_level(Level::Info, sink.clone());
registry.logger("w").warn("careful");

let bytes = sink.with_writer(|buf| buf.clone());
assert!(bytes.ends_with(b"\n"));
```
*/
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    /// Runs `f` against the underlying writer, e.g. to inspect a buffer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> Debug for WriterSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSink")
            .field("writer", &std::any::type_name::<W>())
            .finish()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        self.with_writer(|w| w.write_all(line))
    }

    fn flush(&self) -> io::Result<()> {
        self.with_writer(|w| w.flush())
    }
}
