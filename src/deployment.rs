// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deployment metadata stamped on every record.
//!
//! When the process runs as a named function (the `AWS_LAMBDA_FUNCTION_NAME` variable is set),
//! every record carries `functionName` and `functionVersion`.  The environment is read once,
//! when a [crate::Registry] is created, and never again.

use serde_json::Value;

/// Environment variable holding the function name.
pub const FUNCTION_NAME_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";
/// Environment variable holding the function version.
pub const FUNCTION_VERSION_VAR: &str = "AWS_LAMBDA_FUNCTION_VERSION";

/**
Identity of the deployed function, if any.

```
use fanlog::Deployment;
let d = Deployment::function("resize-images", Some("42"));
assert_eq!(d.function_name(), Some("resize-images"));
assert!(Deployment::none().function_name().is_none());
```
*/
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deployment {
    function: Option<(String, Option<String>)>,
}

impl Deployment {
    /// No deployment metadata; records carry no function fields.
    pub const fn none() -> Self {
        Deployment { function: None }
    }

    pub fn function(name: impl Into<String>, version: Option<impl Into<String>>) -> Self {
        Deployment {
            function: Some((name.into(), version.map(Into::into))),
        }
    }

    /// Reads the function identity from the process environment.  An empty name counts as absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.is_empty());
        match non_empty(FUNCTION_NAME_VAR) {
            Some(name) => Deployment::function(name, non_empty(FUNCTION_VERSION_VAR)),
            None => Deployment::none(),
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn function_version(&self) -> Option<&str> {
        self.function.as_ref().and_then(|(_, v)| v.as_deref())
    }

    /// The `(key, value)` pairs this deployment adds to every record.  A missing version is
    /// written as `null`.
    pub(crate) fn fields(&self) -> Option<[(&'static str, Value); 2]> {
        let (name, version) = self.function.as_ref()?;
        Some([
            ("functionName", Value::String(name.clone())),
            (
                "functionVersion",
                version.clone().map_or(Value::Null, Value::String),
            ),
        ])
    }
}
