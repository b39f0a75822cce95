// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::error::InvalidConfiguration;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/**
Severity of a log event.

Levels are totally ordered from least to most severe.  The order only matters
at registration time: a sink registered at some level also receives every more
severe level.  At call time, an event reaches exactly the sinks in its own
level's list.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Detailed diagnostics
    Debug,
    /// Routine operation
    Info,
    /// Suspicious condition
    Warn,
    /// Runtime error
    Error,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Wire name of the level, as written into the `level` field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Position of the level in [Level::ALL].
    pub const fn index(self) -> usize {
        self as usize
    }

    /**
    This level and every more severe level, least severe first.

    ```
    use fanlog::Level;
    let levels: Vec<Level> = Level::Warn.and_above().collect();
    assert_eq!(levels, vec![Level::Warn, Level::Error]);
    ```
    */
    pub fn and_above(self) -> impl Iterator<Item = Level> {
        Level::ALL[self.index()..].iter().copied()
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = InvalidConfiguration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| InvalidConfiguration::UnknownLevel(s.to_string()))
    }
}

/*
Boilerplate notes.

Copy is fine, it's a small enum.
Ord follows severity, which is what threshold registration walks.
Default is deliberately absent: no level is more natural than another.
Serialize/Deserialize use the wire names so a Level can sit in a record directly.
*/

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn parses_wire_names() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>(), Ok(level));
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn rejects_unknown_names() {
        assert_eq!(
            "fatal".parse::<Level>(),
            Err(InvalidConfiguration::UnknownLevel("fatal".to_string()))
        );
        // names are case sensitive
        assert!("WARN".parse::<Level>().is_err());
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn threshold_walks_upwards() {
        assert_eq!(Level::Debug.and_above().count(), 4);
        assert_eq!(Level::Error.and_above().collect::<Vec<_>>(), vec![Level::Error]);
        assert!(Level::Debug < Level::Info && Level::Warn < Level::Error);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
    }
}
