// SPDX-License-Identifier: MIT OR Apache-2.0

//! The level registry: which sinks receive which levels.
//!
//! A [`Registry`] keeps, for each [`Level`], the ordered list of sinks that receive events at
//! that level, plus two flags that shape how records are produced: the [`TimeFormat`] and
//! whether any registered sink consumes structured records.
//!
//! # Threshold registration
//!
//! Registering a sink at level L appends it to the list of L and of every more severe level.
//! A sink registered at `warn` receives `warn` and `error`.  The expansion is paid once, here,
//! so that a log call only looks up its own level's list.
//!
//! # Architecture
//!
//! All state sits behind one reader/writer spinlock.  Each level's list is
//! an immutable `Arc<[Arc<dyn Sink>]>` that registration replaces wholesale, so a log call
//! clones one `Arc` under the read lock and writes to its sinks after releasing it.  In-flight
//! calls keep delivering to the list they saw, even if the registry is reset meanwhile.
//!
//! # Examples
//!
//! ```
//! use fanlog::{Registry, OutputConfig, InMemorySink, Level};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new());
//! let sink = Arc::new(InMemorySink::new());
//! registry.register(OutputConfig::new().level("warn").stream(sink.clone())).unwrap();
//!
//! assert!(!registry.is_enabled(Level::Info));
//! assert!(registry.is_enabled(Level::Error));
//! ```
//!
//! Several outputs at once:
//!
//! ```
//! use fanlog::{Registry, OutputConfig, InMemorySink};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let everything = Arc::new(InMemorySink::new());
//! let errors = Arc::new(InMemorySink::records());
//! registry.register_batch([
//!     OutputConfig::new().level("debug").stream(everything),
//!     OutputConfig::new().level("error").stream(errors),
//! ]).unwrap();
//! assert!(registry.has_record_mode());
//! ```

use crate::Level;
use crate::deployment::Deployment;
use crate::error::InvalidConfiguration;
use crate::log_record::TimeFormat;
use crate::logger::Logger;
use crate::sink::{Sink, SinkMode};
use crate::spinlock::Spinlock;
use std::fmt::Debug;
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The sinks of one level, in registration order.
pub type SinkList = Arc<[Arc<dyn Sink>]>;

/**
Options for one registration.

Both options are required; [Registry::register] rejects a config that lacks either.

```
use fanlog::{OutputConfig, StdErrorSink};
use std::sync::Arc;

let config = OutputConfig::new().level("info").stream(Arc::new(StdErrorSink::new()));
```
*/
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Name of the least severe level the sink receives.
    pub level: Option<String>,
    /// The sink.
    pub stream: Option<Arc<dyn Sink>>,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A complete config for a typed level.
    pub fn at(level: crate::Level, stream: Arc<dyn Sink>) -> Self {
        OutputConfig {
            level: Some(level.as_str().to_string()),
            stream: Some(stream),
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn stream(mut self, stream: Arc<dyn Sink>) -> Self {
        self.stream = Some(stream);
        self
    }

    fn validate(self) -> Result<(Level, Arc<dyn Sink>), InvalidConfiguration> {
        let level = self.level.ok_or(InvalidConfiguration::MissingLevel)?;
        let level = level.parse::<Level>()?;
        let stream = self.stream.ok_or(InvalidConfiguration::MissingStream)?;
        Ok((level, stream))
    }
}

#[derive(Debug)]
struct State {
    levels: [SinkList; Level::ALL.len()],
    time: TimeFormat,
    record_mode: bool,
}

impl State {
    fn empty() -> Self {
        State {
            levels: std::array::from_fn(|_| Arc::from(Vec::<Arc<dyn Sink>>::new())),
            time: TimeFormat::default(),
            record_mode: false,
        }
    }
}

/// What a log call needs from the registry, read under one lock acquisition.
pub(crate) struct Route {
    pub(crate) sinks: SinkList,
    pub(crate) time: TimeFormat,
    pub(crate) record_mode: bool,
}

/**
Per-level sink lists and the flags that govern record construction.

A registry is usually shared: wrap it in an `Arc` and hand out [Logger]s with
[Registry::logger].  [crate::global()] is the process-wide instance; tests typically create their
own.
*/
pub struct Registry {
    state: Spinlock<State>,
    deployment: Deployment,
    write_failures: AtomicU64,
    records_built: AtomicU64,
}

impl Registry {
    /// An empty registry.  Deployment metadata is read from the environment now, once.
    pub fn new() -> Self {
        Self::with_deployment(Deployment::from_env())
    }

    /// An empty registry stamping `deployment` on every record.
    pub fn with_deployment(deployment: Deployment) -> Self {
        Registry {
            state: Spinlock::new(State::empty()),
            deployment,
            write_failures: AtomicU64::new(0),
            records_built: AtomicU64::new(0),
        }
    }

    /// A logger named `name` that writes through this registry.
    pub fn logger(self: &Arc<Self>, name: impl Into<String>) -> Logger {
        Logger::new(self.clone(), name)
    }

    /**
    Registers one output.

    # Errors

    [InvalidConfiguration] when the level is missing or unknown, or the stream is missing.
    Nothing is registered in that case.
    */
    pub fn register(&self, config: OutputConfig) -> Result<(), InvalidConfiguration> {
        let (level, stream) = config.validate()?;
        self.register_level(level, stream);
        Ok(())
    }

    /**
    Registers each output in turn.

    # Errors

    Stops at the first invalid config.  Configs before it stay registered.
    */
    pub fn register_batch<I>(&self, configs: I) -> Result<(), InvalidConfiguration>
    where
        I: IntoIterator<Item = OutputConfig>,
    {
        configs.into_iter().try_for_each(|config| self.register(config))
    }

    /// Appends `sink` to the list of `level` and of every more severe level.
    pub fn register_level(&self, level: Level, sink: Arc<dyn Sink>) {
        let record_mode = sink.mode() == SinkMode::Record;
        self.state.with_mut(|state| {
            for level in level.and_above() {
                let list = &mut state.levels[level.index()];
                let mut sinks = list.to_vec();
                sinks.push(sink.clone());
                *list = sinks.into();
            }
            // cleared only by reset
            state.record_mode |= record_mode;
        });
    }

    /// Drops every registration and restores the default time format.  Idempotent.
    pub fn reset(&self) {
        let previous = self.state.with_mut(|state| std::mem::replace(state, State::empty()));
        // sinks may run arbitrary code on drop, keep that outside the lock
        drop(previous);
    }

    /// Chooses epoch-millisecond timestamps (`true`) or ISO-8601 strings (`false`, the default).
    pub fn set_fast_time(&self, enabled: bool) {
        let time = if enabled {
            TimeFormat::EpochMillis
        } else {
            TimeFormat::Iso8601
        };
        self.state.with_mut(|state| state.time = time);
    }

    /// Shorthand for `set_fast_time(true)`.
    pub fn enable_fast_time(&self) {
        self.set_fast_time(true);
    }

    pub fn time_format(&self) -> TimeFormat {
        self.state.with(|state| state.time)
    }

    /// Whether a call at `level` would reach any sink.
    pub fn is_enabled(&self, level: Level) -> bool {
        self.state.with(|state| !state.levels[level.index()].is_empty())
    }

    /// The sinks receiving `level`, in write order.
    pub fn sinks(&self, level: Level) -> SinkList {
        self.state.with(|state| state.levels[level.index()].clone())
    }

    /// Whether a record-mode sink has been registered since the last reset.
    pub fn has_record_mode(&self) -> bool {
        self.state.with(|state| state.record_mode)
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Sink writes that returned an error or panicked, over the registry's lifetime.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Structured records constructed, over the registry's lifetime.  At most one per log call.
    pub fn records_built(&self) -> u64 {
        self.records_built.load(Ordering::Relaxed)
    }

    /**
    Flushes every distinct registered sink.

    # Errors

    Every sink is flushed even if some fail; the first failure is returned.
    */
    pub fn flush(&self) -> io::Result<()> {
        let mut seen: Vec<Arc<dyn Sink>> = Vec::new();
        for level in Level::ALL {
            for sink in self.sinks(level).iter() {
                if !seen.iter().any(|s| same_sink(s, sink)) {
                    seen.push(sink.clone());
                }
            }
        }
        let mut first_error = None;
        for sink in seen {
            let result = catch_unwind(AssertUnwindSafe(|| sink.flush()))
                .unwrap_or_else(|_| Err(io::Error::other("sink panicked while flushing")));
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn route(&self, level: Level) -> Route {
        self.state.with(|state| Route {
            sinks: state.levels[level.index()].clone(),
            time: state.time,
            record_mode: state.record_mode,
        })
    }

    pub(crate) fn count_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_record_built(&self) {
        self.records_built.fetch_add(1, Ordering::Relaxed);
    }
}

fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.state.with(|state| {
            let mut s = f.debug_struct("Registry");
            for level in Level::ALL {
                s.field(level.as_str(), &state.levels[level.index()].len());
            }
            s.field("time", &state.time)
                .field("record_mode", &state.record_mode)
                .field("deployment", &self.deployment)
                .finish()
        })
    }
}
