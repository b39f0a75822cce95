// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-site macros.
//!
//! A log call takes a leading input and any number of substitution arguments.  The macros
//! accept exactly that shape:
//!
//! ```rust
//! use fanlog::{Registry, InMemorySink, Level, Input};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(Registry::new());
//! let sink = Arc::new(InMemorySink::records());
//! registry.register_level(Level::Debug, sink.clone());
//! let log = registry.logger("strfmt");
//!
//! fanlog::error!(log, "a string [%s], a number [%d]", "str", 101);
//! fanlog::info!(log, true);
//! fanlog::debug!(log, serde_json::json!({"user": "ana"}), "logged in after %d tries", 3);
//!
//! let err = std::io::Error::other("error msg in here");
//! fanlog::warn!(log, Input::error(&err), "this is a %s", "message");
//!
//! let records = sink.drain_records();
//! assert_eq!(records[0].message(), Some("a string [str], a number [101]"));
//! assert_eq!(records[1].message(), Some("true"));
//! assert_eq!(records[2]["user"], "ana");
//! assert_eq!(records[3]["err"]["message"], "error msg in here");
//! assert_eq!(records[3].message(), Some("this is a message"));
//! ```
//!
//! Nothing after the logger is evaluated unless the level has a sink: a disabled call costs
//! one lookup.  Arguments may be any `serde::Serialize` value; one that fails to serialize is
//! replaced by `"[Unserializable]"`.

/// Logs at an explicit level.  See the [module documentation](crate::macros).
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $input:expr $(, $arg:expr)* $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        logger.log_with($level, || {
            (
                $crate::Input::from($input),
                ::std::vec![$($crate::input::to_value(&$arg)),*],
            )
        })
    }};
}

/// Logs at [Level::Debug](crate::Level::Debug).
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}

/// Logs at [Level::Info](crate::Level::Info).
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

/// Logs at [Level::Warn](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

/// Logs at [Level::Error](crate::Level::Error).
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::deployment::Deployment;
    use crate::inmemory_sink::InMemorySink;
    use crate::{Level, Registry};
    use std::sync::Arc;

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn args_not_evaluated_when_disabled() {
        let registry = Arc::new(Registry::with_deployment(Deployment::none()));
        registry.register_level(Level::Warn, Arc::new(InMemorySink::new()));
        let log = registry.logger("lazy");
        let mut evaluated = 0;
        let mut expensive = || {
            evaluated += 1;
            "value"
        };
        crate::debug!(log, "%s", expensive());
        crate::info!(log, "%s", expensive());
        crate::warn!(log, "%s", expensive());
        assert_eq!(evaluated, 1);
        assert_eq!(registry.records_built(), 1);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn string_formatting_cases() {
        let registry = Arc::new(Registry::with_deployment(Deployment::none()));
        let sink = Arc::new(InMemorySink::records());
        registry.register_level(Level::Debug, sink.clone());
        let log = registry.logger("strfmt");

        crate::debug!(log, ());
        crate::debug!(log, "test");
        crate::info!(log, false);
        crate::warn!(log, "a number [%d]", 42);
        crate::error!(
            log,
            "a string [%s], a number [%d], %s, %s, %s",
            "str",
            101,
            "s",
            1,
            2,
            "a",
            "b",
            "c",
        );
        crate::error!(log, "foo", "bar", "baz");
        crate::log!(log, Level::Info, "level %s", Level::Info);

        let messages: Vec<Option<String>> = sink
            .drain_records()
            .iter()
            .map(|r| r.message().map(str::to_string))
            .collect();
        assert_eq!(
            messages,
            vec![
                None,
                Some("test".to_string()),
                Some("false".to_string()),
                Some("a number [42]".to_string()),
                Some("a string [str], a number [101], s, 1, 2 a b c".to_string()),
                Some("foo bar baz".to_string()),
                Some("level info".to_string()),
            ]
        );
    }
}
