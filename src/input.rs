// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of a log call's first argument.
//!
//! A log call takes one leading [`Input`] plus any number of substitution arguments.  The input
//! is classified once, at the call boundary, into one of a closed set of shapes:
//!
//! - [`Input::Format`]: a printf-style format string (or none at all).  Every argument is
//!   substituted into it.
//! - [`Input::Bool`]: the message becomes `"true"` or `"false"`.
//! - [`Input::Error`]: becomes the nested `err` record.
//! - [`Input::Request`]: becomes the nested `req` record.
//! - [`Input::Object`]: caller fields, merged over the conventional ones.
//!
//! For the last four, the remaining arguments are formatted on their own to produce the
//! message, with the first of them acting as the format string when it is a string.
//!
//! [`normalize`] turns an input and its arguments into [`Normalized`] fields ready for the
//! record builder.

use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::net::SocketAddr;

/// Field map of a record, in insertion order.
pub type Fields = Map<String, Value>;

/// Written in place of any value that cannot be serialized.
pub const UNSERIALIZABLE: &str = "[Unserializable]";

/// Converts any serializable value into a JSON value.  Each member that fails to serialize is
/// replaced by [UNSERIALIZABLE]; the rest of the value is kept.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    crate::lenient::to_value(value)
}

/// The classified first argument of a log call.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A format string, or no leading argument at all.
    Format(Option<String>),
    /// A bare boolean.
    Bool(bool),
    /// An error.
    Error(ErrorInfo),
    /// An HTTP request.
    Request(RequestInfo),
    /// Free-form caller fields.
    Object(Fields),
}

impl Input {
    /// Classifies any `std::error::Error`, following its `source()` chain for the stack.
    pub fn error<E: StdError + ?Sized>(err: &E) -> Self {
        Input::Error(ErrorInfo::from_error(err))
    }

    /**
    Classifies any serializable value as caller fields.

    A value that does not serialize to a JSON object contributes no fields.  A member that
    fails to serialize is written as `"[Unserializable]"` next to its siblings.

    ```
    use fanlog::Input;
    #[derive(serde::Serialize)]
    struct Job { id: u32 }

    let Input::Object(fields) = Input::fields(&Job { id: 7 }) else { unreachable!() };
    assert_eq!(fields["id"], 7);
    ```
    */
    pub fn fields<T: Serialize + ?Sized>(value: &T) -> Self {
        match to_value(value) {
            Value::Object(map) => Input::Object(map),
            _ => Input::Object(Fields::new()),
        }
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Format(Some(s.to_string()))
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Format(Some(s))
    }
}

impl From<&String> for Input {
    fn from(s: &String) -> Self {
        Input::Format(Some(s.clone()))
    }
}

impl From<Option<&str>> for Input {
    fn from(s: Option<&str>) -> Self {
        Input::Format(s.map(str::to_string))
    }
}

impl From<()> for Input {
    fn from(_: ()) -> Self {
        Input::Format(None)
    }
}

impl From<bool> for Input {
    fn from(b: bool) -> Self {
        Input::Bool(b)
    }
}

impl From<ErrorInfo> for Input {
    fn from(err: ErrorInfo) -> Self {
        Input::Error(err)
    }
}

impl From<RequestInfo> for Input {
    fn from(req: RequestInfo) -> Self {
        Input::Request(req)
    }
}

impl From<Fields> for Input {
    fn from(fields: Fields) -> Self {
        Input::Object(fields)
    }
}

/// JSON values classify by kind.  Arrays merge keyed by index; bare numbers contribute nothing.
impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Input::Format(None),
            Value::Bool(b) => Input::Bool(b),
            Value::String(s) => Input::Format(Some(s)),
            Value::Object(map) => Input::Object(map),
            Value::Array(items) => Input::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
            ),
            Value::Number(_) => Input::Object(Fields::new()),
        }
    }
}

/**
The `err` part of a record.

```
use fanlog::ErrorInfo;
let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
let info = ErrorInfo::from_error(&io).with_code("ENOENT");
assert_eq!(info.name, "Error");
assert_eq!(info.message, "no such file");
assert_eq!(info.stack, "Error: no such file");
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    pub code: Option<Value>,
    pub stack: String,
}

impl ErrorInfo {
    /// An error with no cause; its stack is `"<name>: <message>"`.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = format!("{name}: {message}");
        ErrorInfo {
            name,
            message,
            code: None,
            stack,
        }
    }

    /// Builds from any error.  The name is the error's short type name; every `source()` is
    /// appended to the stack on its own `Caused by: ` line.
    pub fn from_error<E: StdError + ?Sized>(err: &E) -> Self {
        let mut info = ErrorInfo::new(short_type_name::<E>(), err.to_string());
        let mut source = err.source();
        while let Some(cause) = source {
            info.stack.push_str("\nCaused by: ");
            info.stack.push_str(&cause.to_string());
            source = cause.source();
        }
        info
    }

    pub fn with_code(mut self, code: impl Serialize) -> Self {
        self.code = Some(crate::input::to_value(&code));
        self
    }

    /// Replaces the stack, e.g. with a captured `std::backtrace::Backtrace`.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Appends `cause` (and its own causes) to this error's stack.
    pub fn caused_by(mut self, cause: &ErrorInfo) -> Self {
        self.stack.push_str("\nCaused by: ");
        self.stack.push_str(&cause.stack);
        self
    }

    fn into_fields(self) -> Fields {
        let mut err = Fields::new();
        err.insert("name".into(), Value::String(self.name));
        err.insert("message".into(), Value::String(self.message));
        if let Some(code) = self.code {
            err.insert("code".into(), code);
        }
        err.insert("stack".into(), Value::String(self.stack));
        err
    }
}

/// `std::io::Error` → `Error`; trait objects and generics are reduced the same way.
fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    let base = base.trim_start_matches("dyn ");
    let base = base.split(" + ").next().unwrap_or(base);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/**
The `req` part of a record.

```
use fanlog::RequestInfo;
let req = RequestInfo::new("GET", "/health")
    .header("user-agent", "probe")
    .remote("10.0.0.7:5123".parse().unwrap());
assert_eq!(req.remote_port, Some(5123));
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    pub method: String,
    pub url: String,
    pub headers: Fields,
    pub remote_address: Option<String>,
    pub remote_port: Option<u16>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        RequestInfo {
            method: method.into(),
            url: url.into(),
            headers: Fields::new(),
            remote_address: None,
            remote_port: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Records the peer of the connection that carried the request.
    pub fn remote(mut self, peer: SocketAddr) -> Self {
        self.remote_address = Some(peer.ip().to_string());
        self.remote_port = Some(peer.port());
        self
    }

    fn into_fields(self) -> Fields {
        let mut req = Fields::new();
        req.insert("method".into(), Value::String(self.method));
        req.insert("url".into(), Value::String(self.url));
        req.insert("headers".into(), Value::Object(self.headers));
        req.insert(
            "remoteAddress".into(),
            self.remote_address.map_or(Value::Null, Value::String),
        );
        req.insert(
            "remotePort".into(),
            self.remote_port.map_or(Value::Null, Value::from),
        );
        req
    }
}

/// Reads method, URI and headers.  The peer comes from a `SocketAddr` extension, when a server
/// put one there.
#[cfg(feature = "http")]
impl<B> From<&http::Request<B>> for RequestInfo {
    fn from(req: &http::Request<B>) -> Self {
        let mut info = RequestInfo::new(req.method().as_str(), req.uri().to_string());
        for (name, value) in req.headers() {
            info.headers.insert(
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            );
        }
        if let Some(peer) = req.extensions().get::<SocketAddr>() {
            info = info.remote(*peer);
        }
        info
    }
}

#[cfg(feature = "http")]
impl<B> From<&http::Request<B>> for Input {
    fn from(req: &http::Request<B>) -> Self {
        Input::Request(req.into())
    }
}

/// What the record builder needs from one log call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    /// `err`, `req`, or caller fields.
    pub fields: Fields,
    /// The formatted message; `None` when it would be empty.
    pub message: Option<String>,
}

/**
Classifies `input` and formats the message.

```
use fanlog::input::{normalize, Input};
use serde_json::json;

let n = normalize(Input::from("count [%d]"), &[json!(42)]);
assert_eq!(n.message.as_deref(), Some("count [42]"));

let n = normalize(Input::from(json!({"a": 1})), &[]);
assert_eq!(n.message, None);
assert_eq!(n.fields["a"], 1);
```
*/
pub fn normalize(input: Input, args: &[Value]) -> Normalized {
    let mut fields = Fields::new();
    let message = match input {
        Input::Format(format) => crate::format::format(format.as_deref(), args),
        Input::Bool(b) => b.to_string(),
        Input::Error(err) => {
            fields.insert("err".into(), Value::Object(err.into_fields()));
            format_remaining(args)
        }
        Input::Request(req) => {
            fields.insert("req".into(), Value::Object(req.into_fields()));
            format_remaining(args)
        }
        Input::Object(object) => {
            fields = object;
            format_remaining(args)
        }
    };
    Normalized {
        fields,
        message: (!message.is_empty()).then_some(message),
    }
}

/// The arguments after a non-format input: a leading string acts as the format.
fn format_remaining(args: &[Value]) -> String {
    match args.split_first() {
        None => String::new(),
        Some((Value::String(format), rest)) => crate::format::format(Some(format), rest),
        Some(_) => crate::format::format(None, args),
    }
}
