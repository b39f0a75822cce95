// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::dispatch::dispatch;
use crate::input::{Input, normalize};
use crate::registry::Registry;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/**
A named source of log events.

A logger is a name plus the registry it writes through.  Children extend the name with
`parent:child`; that is the whole hierarchy.  Parents and children share nothing but the
registry, so registration applies to every logger equally.

```
use fanlog::{Registry, InMemorySink, Level};
use std::sync::Arc;

let registry = Arc::new(Registry::new());
let sink = Arc::new(InMemorySink::records());
registry.register_level(Level::Debug, sink.clone());

let log = registry.logger("parent");
log.child("sub").info("ready");

let records = sink.drain_records();
assert_eq!(records[0].name(), Some("parent:sub"));
assert_eq!(records[0].message(), Some("ready"));
```

Substitution arguments go through [Logger::log] or the macros:

```
# use fanlog::{Registry, InMemorySink, Level};
# use std::sync::Arc;
# let registry = Arc::new(Registry::new());
# let sink = Arc::new(InMemorySink::records());
# registry.register_level(Level::Debug, sink.clone());
let log = registry.logger("jobs");
fanlog::warn!(log, "count [%d]", 42);
assert_eq!(sink.drain_records()[0].message(), Some("count [42]"));
```
*/
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    registry: Arc<Registry>,
}

impl Logger {
    pub fn new(registry: Arc<Registry>, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Logger {
            name: name.into(),
            registry,
        }
    }

    /// The fully qualified name written into the `name` field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// A logger named `<self>:<name>` on the same registry.
    pub fn child(&self, name: &str) -> Logger {
        Logger {
            name: format!("{}:{}", self.name, name).into(),
            registry: self.registry.clone(),
        }
    }

    /// Whether a call at `level` would reach any sink.
    pub fn is_enabled(&self, level: Level) -> bool {
        self.registry.is_enabled(level)
    }

    /**
    Logs `input` at `level`, substituting `args` into the message.

    `input` is converted and classified only if the level has sinks.
    */
    pub fn log<I: Into<Input>>(&self, level: Level, input: I, args: &[Value]) {
        dispatch(&self.registry, level, &self.name, || normalize(input.into(), args));
    }

    /// Like [Self::log], but the input and arguments are produced by `call` only if the level
    /// has sinks.  The macros expand to this.
    pub fn log_with<F>(&self, level: Level, call: F)
    where
        F: FnOnce() -> (Input, Vec<Value>),
    {
        dispatch(&self.registry, level, &self.name, || {
            let (input, args) = call();
            normalize(input, &args)
        });
    }

    pub fn debug<I: Into<Input>>(&self, input: I) {
        self.log(Level::Debug, input, &[]);
    }

    pub fn info<I: Into<Input>>(&self, input: I) {
        self.log(Level::Info, input, &[]);
    }

    pub fn warn<I: Into<Input>>(&self, input: I) {
        self.log(Level::Warn, input, &[]);
    }

    pub fn error<I: Into<Input>>(&self, input: I) {
        self.log(Level::Error, input, &[]);
    }
}

impl Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}

/*
Boilerplate notes.

Clone is cheap, two Arcs.
PartialEq would have to decide whether registry identity matters; it's left out.
Default makes no sense without a name.
Display is not implemented, name() is there for that.
*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::Deployment;
    use crate::inmemory_sink::InMemorySink;
    use serde_json::json;

    fn setup() -> (Arc<Registry>, Arc<InMemorySink>) {
        let registry = Arc::new(Registry::with_deployment(Deployment::none()));
        let sink = Arc::new(InMemorySink::records());
        registry.register_level(Level::Debug, sink.clone());
        (registry, sink)
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn children_nest_names() {
        let (registry, sink) = setup();
        let parent = registry.logger("parent");
        let sub2 = parent.child("sub2");
        parent.debug(json!({"aDebug": "object"}));
        parent.child("sub1").info(json!({"anInfo": "object"}));
        sub2.warn(json!({"aWarn": "object"}));
        sub2.child("subsub").error(json!({"anError": "object"}));

        let names: Vec<String> = sink
            .drain_records()
            .iter()
            .map(|r| format!("{}/{}", r.name().unwrap(), r["level"].as_str().unwrap()))
            .collect();
        assert_eq!(
            names,
            [
                "parent/debug",
                "parent:sub1/info",
                "parent:sub2/warn",
                "parent:sub2:subsub/error"
            ]
        );
        assert_eq!(parent.name(), "parent");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn error_input_gets_err_fields() {
        let (registry, sink) = setup();
        let err = std::io::Error::other("boom");
        registry.logger("x").error(Input::error(&err));
        let record = &sink.drain_records()[0];
        assert_eq!(record["err"]["name"], "Error");
        assert_eq!(record["err"]["message"], "boom");
        assert!(!record["err"]["stack"].as_str().unwrap().is_empty());
        assert!(record.message().is_none());
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn conversion_is_skipped_when_disabled() {
        struct Expensive<'a>(&'a std::cell::Cell<u32>);
        impl From<Expensive<'_>> for Input {
            fn from(e: Expensive<'_>) -> Input {
                e.0.set(e.0.get() + 1);
                Input::Format(Some("expensive".into()))
            }
        }
        let registry = Arc::new(Registry::with_deployment(Deployment::none()));
        registry.register_level(Level::Error, Arc::new(InMemorySink::new()));
        let log = registry.logger("lazy");
        let conversions = std::cell::Cell::new(0);
        log.debug(Expensive(&conversions));
        log.info(Expensive(&conversions));
        assert_eq!(conversions.get(), 0);
        log.error(Expensive(&conversions));
        assert_eq!(conversions.get(), 1);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unserializable_member_keeps_its_siblings() {
        #[derive(serde::Serialize)]
        struct Job {
            id: u32,
            by_cell: std::collections::HashMap<(u32, u32), u32>,
        }
        let (registry, sink) = setup();
        let job = Job {
            id: 7,
            by_cell: [((0, 1), 2)].into_iter().collect(),
        };
        registry.logger("p").info(Input::fields(&job));

        let record = &sink.drain_records()[0];
        assert_eq!(record["id"], 7);
        assert_eq!(record["by_cell"], crate::input::UNSERIALIZABLE);
        assert_eq!(record.name(), Some("p"));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn log_with_args() {
        let (registry, sink) = setup();
        registry
            .logger("fmt")
            .log(Level::Info, "a string [%s]", &[json!("str")]);
        assert_eq!(sink.drain_records()[0].message(), Some("a string [str]"));
    }
}
