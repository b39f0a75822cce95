// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record dispatch.
//!
//! Every log call, whether it comes from a [`Logger`](crate::Logger) method or one of the
//! macros, ends up in [`dispatch`].
//!
//! # Architecture
//!
//! The flow for one call at level L:
//! 1. Read L's sink list from the registry.  If it is empty, return: the arguments are never
//!    converted, normalized or serialized.
//! 2. Normalize the arguments once.
//! 3. If L has a single sink and no sink anywhere consumes records, build and serialize the
//!    record and write the line.  This is the common case.
//! 4. Otherwise walk L's sinks in registration order.  The structured record is built the first
//!    time any sink needs it, and the serialized line the first time a bytes sink needs it.
//!    Both are reused for every later sink, so a call builds at most one record and serializes
//!    at most once, however many sinks it reaches.
//!
//! The line is serialized from the record itself, so every sink sees the same `time`.
//!
//! A record-mode sink whose `write_record` reports [`io::ErrorKind::Unsupported`] is handed the
//! shared line instead.
//!
//! # Failure
//!
//! Each sink write is isolated.  A sink that returns an error or panics is counted in
//! [`Registry::write_failures`](crate::Registry::write_failures) and the remaining sinks still
//! receive the event.  Nothing is retried and nothing reaches the caller.

use crate::Level;
use crate::input::Normalized;
use crate::log_record::{LogRecord, TimeFormat};
use crate::registry::Registry;
use crate::sink::{Sink, SinkMode};
use std::cell::{Cell, OnceCell};
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};

/**
Delivers one log call at `level` from the logger `name`.

`normalize` runs only if `level` has at least one sink.
*/
pub(crate) fn dispatch<F>(registry: &Registry, level: Level, name: &str, normalize: F)
where
    F: FnOnce() -> Normalized,
{
    let route = registry.route(level);
    if route.sinks.is_empty() {
        return;
    }

    let event = Event {
        registry,
        level,
        name,
        time: route.time,
        pending: Cell::new(Some(normalize())),
        record: OnceCell::new(),
        line: OnceCell::new(),
    };

    if let [only] = &route.sinks[..] {
        if !route.record_mode {
            deliver(registry, || only.write_line(event.line()));
            return;
        }
    }

    for sink in route.sinks.iter() {
        match sink.mode() {
            SinkMode::Record => deliver(registry, || match sink.write_record(event.record()) {
                Err(e) if e.kind() == io::ErrorKind::Unsupported => sink.write_line(event.line()),
                written => written,
            }),
            SinkMode::Bytes => deliver(registry, || sink.write_line(event.line())),
        }
    }
}

/// One call's representations, each computed on first use.
struct Event<'a> {
    registry: &'a Registry,
    level: Level,
    name: &'a str,
    time: TimeFormat,
    pending: Cell<Option<Normalized>>,
    record: OnceCell<LogRecord>,
    line: OnceCell<Vec<u8>>,
}

impl Event<'_> {
    fn record(&self) -> &LogRecord {
        self.record.get_or_init(|| {
            let Normalized { fields, message } = self.pending.take().unwrap_or_default();
            self.registry.count_record_built();
            LogRecord::build(
                self.level,
                self.name,
                self.time,
                self.registry.deployment(),
                message.as_deref(),
                fields,
            )
        })
    }

    fn line(&self) -> &[u8] {
        self.line.get_or_init(|| self.record().to_line())
    }
}

/// Runs one sink write, absorbing its failure.
fn deliver<W>(registry: &Registry, write: W)
where
    W: FnOnce() -> io::Result<()>,
{
    match catch_unwind(AssertUnwindSafe(write)) {
        Ok(Ok(())) => {}
        Ok(Err(_)) | Err(_) => registry.count_write_failure(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::Deployment;
    use crate::input::{Input, normalize};
    use crate::inmemory_sink::InMemorySink;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// Remembers where each line it received lived, to tell shared buffers from copies.
    #[derive(Debug, Default)]
    struct AddressSink {
        mode: SinkMode,
        seen: Mutex<Vec<(usize, Vec<u8>)>>,
    }

    impl Sink for AddressSink {
        fn mode(&self) -> SinkMode {
            self.mode
        }

        fn write_line(&self, line: &[u8]) -> io::Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((line.as_ptr() as usize, line.to_vec()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingSink {
        panic: bool,
    }

    impl Sink for FailingSink {
        fn write_line(&self, _: &[u8]) -> io::Result<()> {
            if self.panic {
                panic!("sink exploded");
            }
            Err(io::Error::other("disk full"))
        }
    }

    fn registry() -> Registry {
        Registry::with_deployment(Deployment::none())
    }

    fn call(registry: &Registry, level: Level, input: Input, args: &[Value]) {
        dispatch(registry, level, "test", || normalize(input, args));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn disabled_level_does_no_work() {
        let registry = registry();
        registry.register_level(Level::Warn, Arc::new(InMemorySink::new()));
        let mut normalized = false;
        dispatch(&registry, Level::Info, "quiet", || {
            normalized = true;
            Normalized::default()
        });
        assert!(!normalized);
        assert_eq!(registry.records_built(), 0);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn single_sink_fast_path() {
        let registry = registry();
        let sink = Arc::new(InMemorySink::new());
        registry.register_level(Level::Debug, sink.clone());
        call(&registry, Level::Debug, json!({"a": 1}).into(), &[]);

        let lines = sink.drain_lines();
        assert_eq!(lines.len(), 1);
        let record: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record["name"], "test");
        assert_eq!(record["level"], "debug");
        assert_eq!(record["a"], 1);
        assert!(record["time"].is_string());
        assert_eq!(registry.records_built(), 1);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn one_serialization_shared_by_bytes_sinks() {
        let registry = registry();
        let first = Arc::new(AddressSink::default());
        let second = Arc::new(AddressSink::default());
        let records = Arc::new(InMemorySink::records());
        registry.register_level(Level::Error, first.clone());
        registry.register_level(Level::Error, records.clone());
        registry.register_level(Level::Error, second.clone());

        call(&registry, Level::Error, "boom %d".into(), &[json!(1)]);

        let first = first.seen.lock().unwrap();
        let second = second.seen.lock().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        // same buffer, so it was serialized once
        assert_eq!(first[0].0, second[0].0);
        assert_eq!(registry.records_built(), 1);

        let structured = records.drain_records();
        assert_eq!(structured.len(), 1);
        let parsed = LogRecord::parse_line(&first[0].1).expect("json line");
        assert_eq!(parsed, structured[0]);
        assert_eq!(parsed.message(), Some("boom 1"));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn record_only_sinks_skip_serialization() {
        let registry = registry();
        let a = Arc::new(InMemorySink::records());
        let b = Arc::new(InMemorySink::records());
        registry.register_level(Level::Info, a.clone());
        registry.register_level(Level::Info, b.clone());
        call(&registry, Level::Info, true.into(), &[]);
        assert_eq!(a.drain_records()[0].message(), Some("true"));
        assert_eq!(b.drain_records()[0].message(), Some("true"));
        assert_eq!(registry.records_built(), 1);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn line_only_record_sinks_share_the_line() {
        let registry = registry();
        let first = Arc::new(AddressSink {
            mode: SinkMode::Record,
            ..Default::default()
        });
        let second = Arc::new(AddressSink {
            mode: SinkMode::Record,
            ..Default::default()
        });
        registry.register_level(Level::Info, first.clone());
        registry.register_level(Level::Info, second.clone());

        call(&registry, Level::Info, "x".into(), &[]);

        let first = first.seen.lock().unwrap();
        let second = second.seen.lock().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].0, second[0].0);
        assert_eq!(registry.write_failures(), 0);
        let parsed = LogRecord::parse_line(&first[0].1).expect("json line");
        assert_eq!(parsed.message(), Some("x"));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failures_are_isolated() {
        let registry = registry();
        let before = Arc::new(InMemorySink::new());
        let after = Arc::new(InMemorySink::records());
        registry.register_level(Level::Warn, before.clone());
        registry.register_level(Level::Warn, Arc::new(FailingSink { panic: false }));
        #[cfg(not(target_arch = "wasm32"))]
        registry.register_level(Level::Warn, Arc::new(FailingSink { panic: true }));
        registry.register_level(Level::Warn, after.clone());

        call(&registry, Level::Warn, "still here".into(), &[]);

        assert_eq!(before.drain_lines().len(), 1);
        assert_eq!(after.drain_records().len(), 1);
        #[cfg(not(target_arch = "wasm32"))]
        assert_eq!(registry.write_failures(), 2);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn writes_follow_registration_order() {
        #[derive(Debug)]
        struct Tagged(&'static str, Arc<Mutex<Vec<&'static str>>>);
        impl Sink for Tagged {
            fn write_line(&self, _: &[u8]) -> io::Result<()> {
                self.1.lock().unwrap().push(self.0);
                Ok(())
            }
        }
        let order = Arc::new(Mutex::new(Vec::new()));
        let registry = registry();
        for tag in ["a", "b", "c"] {
            registry.register_level(Level::Debug, Arc::new(Tagged(tag, order.clone())));
        }
        call(&registry, Level::Error, ().into(), &[]);
        assert_eq!(*order.lock().unwrap(), ["a", "b", "c"]);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn fast_time_reaches_records() {
        let registry = registry();
        let sink = Arc::new(InMemorySink::records());
        registry.register_level(Level::Info, sink.clone());
        registry.enable_fast_time();
        call(&registry, Level::Info, ().into(), &[]);
        let record = &sink.drain_records()[0];
        assert!(record.time().is_some_and(Value::is_i64));
        assert!(record.message().is_none());
    }
}
