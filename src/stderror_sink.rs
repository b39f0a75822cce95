// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::sink::Sink;
use std::io;

/**
A reference sink that writes each line to stderr.

On wasm32 the line goes to the browser console instead.
 */
#[derive(Debug, Clone, Copy, Default)]
pub struct StdErrorSink {}

impl StdErrorSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Sink for StdErrorSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            //one write_all under the lock keeps lines from interleaving
            std::io::stderr().lock().write_all(line)
        }
        #[cfg(target_arch = "wasm32")]
        {
            let msg = String::from_utf8_lossy(line.strip_suffix(b"\n").unwrap_or(line));
            web_sys::console::log_1(&(&*msg).into());
            Ok(())
        }
    }

    fn flush(&self) -> io::Result<()> {
        //nothing to do since we are unbuffered
        Ok(())
    }
}
