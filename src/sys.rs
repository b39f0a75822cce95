// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific wall clock.
//!
//! On native platforms the clock comes from `std::time`, while on WASM it comes from `web_time`.
//! Both timestamp representations written into records derive from [`now_millis`].

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.  A clock set before 1970 reads as 0.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
