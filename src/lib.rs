//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# fanlog

fanlog is a structured logging library that writes one JSON object per line and fans every
event out to the sinks registered for its level.

# The problem

Services that log JSON often want more than one destination: everything to a file, warnings and
above to stderr, errors to an alerting pipe.  The obvious implementation builds and serializes
the event once per destination.  With three destinations an error is formatted three times.

fanlog keeps, for each level, the list of sinks that should receive it.  A log call does one
lookup; if the list is empty it returns before doing anything else.  Otherwise the record is
built at most once and serialized at most once, and every sink receives the same bytes.

# Levels and thresholds

There are four levels, `debug < info < warn < error`.  Registering a sink at a level registers
it at that level and every level above:

```rust
use fanlog::{Level, OutputConfig, Registry, InMemorySink};
use std::sync::Arc;

let registry = Arc::new(Registry::new());
let sink = Arc::new(InMemorySink::new());
registry.register(OutputConfig::new().level("warn").stream(sink.clone())).unwrap();

let log = registry.logger("billing");
log.info("not written");
log.warn("written");
log.error("written too");
assert_eq!(sink.len(), 2);
```

# Records

Each record carries `time`, `name`, `level` and, when the input yields one, `message`, followed
by the caller's own fields:

```text
{"time":"2024-05-01T12:00:00.000Z","name":"billing","level":"warn","message":"written"}
```

When the process runs as a serverless function (`AWS_LAMBDA_FUNCTION_NAME` is set), every record
also carries `functionName` and `functionVersion`.  See [Deployment].

A log call takes an [Input] and substitution arguments.  Strings are printf-style formats
(see [format](crate::format)); objects are merged into the record; errors and requests are
summarized under `err` and `req`.  The [macros](crate::macros) evaluate none of their arguments
unless the level is enabled.

# Sinks

A [Sink] is either a bytes sink, which receives the serialized line, or a record sink, which
receives the structured [LogRecord] and never causes serialization.  [StdErrorSink],
[WriterSink] and [InMemorySink] are provided.

# The global registry

Most programs configure one registry for the whole process; see [global_logger] and the free
functions [output], [logger] and [reset].

# Multithreading

Registries, loggers and the provided sinks are `Send + Sync`.  Log calls read a snapshot of the
sink lists and never block each other; registration replaces the snapshot.
*/

mod deployment;
mod dispatch;
mod error;
pub mod format;
pub mod global_logger;
mod inmemory_sink;
pub mod input;
mod lenient;
mod level;
mod log_record;
mod logger;
pub mod macros;
mod registry;
mod sink;
mod spinlock;
mod stderror_sink;
mod sys;
mod writer_sink;

pub use deployment::{Deployment, FUNCTION_NAME_VAR, FUNCTION_VERSION_VAR};
pub use error::InvalidConfiguration;
pub use global_logger::{enable_fast_time, global, logger, output, output_batch, reset, set_fast_time};
pub use inmemory_sink::InMemorySink;
pub use input::{ErrorInfo, Fields, Input, RequestInfo};
pub use level::Level;
pub use log_record::{LogRecord, TimeFormat};
pub use logger::Logger;
pub use registry::{OutputConfig, Registry, SinkList};
pub use sink::{Sink, SinkMode};
pub use stderror_sink::StdErrorSink;
pub use writer_sink::WriterSink;
