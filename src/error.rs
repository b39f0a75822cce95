// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors raised by the registration API.
//!
//! Registration is the only place where fanlog is allowed to interrupt the caller.  Once a sink
//! is registered, the logging path never fails: sink write errors are counted and dropped, and
//! values that cannot be serialized are replaced with a placeholder.

use thiserror::Error;

/// A registration request that cannot be honored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidConfiguration {
    /// The `level` option names no known level.
    #[error("unknown level {0:?}, expected one of debug, info, warn, error")]
    UnknownLevel(String),
    /// The `level` option was not provided.
    #[error("must provide a \"level\" option")]
    MissingLevel,
    /// The `stream` option was not provided.
    #[error("must provide a \"stream\" option")]
    MissingStream,
}
