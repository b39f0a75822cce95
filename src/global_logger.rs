// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide registry.
//!
//! Most applications need one registry for the whole process.  This module holds it and
//! offers free functions over it, so that configuration and call sites need not pass a
//! registry around.
//!
//! The registry is created on first use.  That is when deployment metadata is read from the
//! environment; later changes to the environment are not seen.
//!
//! # Examples
//!
//! ```
//! use fanlog::{OutputConfig, StdErrorSink};
//! use std::sync::Arc;
//!
//! fanlog::output(OutputConfig::new().level("info").stream(Arc::new(StdErrorSink::new()))).unwrap();
//!
//! let log = fanlog::logger("server");
//! log.info("listening");
//! fanlog::debug!(log, "not written, debug has no sinks");
//!
//! fanlog::reset();
//! ```
//!
//! # Tests
//!
//! Tests that touch the global registry share it.  Serialize them and `reset()` afterwards,
//! or give each test its own [`Registry`] instead.

use crate::error::InvalidConfiguration;
use crate::logger::Logger;
use crate::registry::{OutputConfig, Registry};
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// The process-wide registry.
pub fn global() -> &'static Arc<Registry> {
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(Registry::new()))
}

/// A logger named `name` on the process-wide registry.
pub fn logger(name: impl Into<String>) -> Logger {
    global().logger(name)
}

/// Registers one output on the process-wide registry.  See [Registry::register].
pub fn output(config: OutputConfig) -> Result<(), InvalidConfiguration> {
    global().register(config)
}

/// Registers several outputs on the process-wide registry.  See [Registry::register_batch].
pub fn output_batch<I>(configs: I) -> Result<(), InvalidConfiguration>
where
    I: IntoIterator<Item = OutputConfig>,
{
    global().register_batch(configs)
}

/// Clears the process-wide registry.  See [Registry::reset].
pub fn reset() {
    global().reset();
}

/// See [Registry::set_fast_time].
pub fn set_fast_time(enabled: bool) {
    global().set_fast_time(enabled);
}

/// See [Registry::enable_fast_time].
pub fn enable_fast_time() {
    global().enable_fast_time();
}
