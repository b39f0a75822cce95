// SPDX-License-Identifier: MIT OR Apache-2.0

//! printf-style message formatting.
//!
//! Follows the conventions of Node's `util.format`, which is what downstream text pipelines
//! expect from this wire format:
//!
//! | directive | renders                                         |
//! |-----------|-------------------------------------------------|
//! | `%s`      | strings raw, everything else as compact JSON    |
//! | `%d`      | the argument as a number (`NaN` if it isn't one)|
//! | `%i`      | the argument as an integer                      |
//! | `%f`      | the argument as a float                         |
//! | `%j`      | JSON                                            |
//! | `%o` `%O` | compact JSON                                    |
//! | `%c`      | nothing (the argument is consumed)              |
//! | `%%`      | a literal `%`                                   |
//!
//! A directive with no argument left stays literal, as does an unknown directive.  Arguments
//! left over after the format string are appended, separated by spaces.

use serde_json::Value;
use std::fmt::Write;

/**
Formats `args` into `format`.

```
use fanlog::format::format;
use serde_json::json;

assert_eq!(format(Some("count [%d]"), &[json!(42)]), "count [42]");
assert_eq!(format(Some("foo"), &[json!("bar"), json!("baz")]), "foo bar baz");
assert_eq!(format(Some("%s and %s"), &[json!("one")]), "one and %s");
assert_eq!(format(None, &[]), "");
```
*/
pub fn format(format: Option<&str>, args: &[Value]) -> String {
    let Some(format) = format else {
        return join(args);
    };
    if args.is_empty() {
        return format.to_string();
    }

    let mut out = String::with_capacity(format.len() + 8 * args.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&directive) = chars.peek() else {
            out.push('%');
            break;
        };
        if directive == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !matches!(directive, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c') {
            out.push('%');
            continue;
        }
        chars.next();
        match args.next() {
            Some(arg) => substitute(&mut out, directive, arg),
            None => {
                out.push('%');
                out.push(directive);
            }
        }
    }
    for arg in args {
        out.push(' ');
        push_plain(&mut out, arg);
    }
    out
}

fn join(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        push_plain(&mut out, arg);
    }
    out
}

fn substitute(out: &mut String, directive: char, arg: &Value) {
    match directive {
        's' => push_plain(out, arg),
        'd' => push_number(out, to_number(arg)),
        'i' => push_number(out, to_integer(arg)),
        'f' => push_number(out, to_float(arg)),
        'j' | 'o' | 'O' => out.push_str(&arg.to_string()),
        // %c carries CSS in a browser console; it has no meaning in a record
        _ => {}
    }
}

/// Strings go in raw; everything else as its compact JSON text.
fn push_plain(out: &mut String, arg: &Value) {
    match arg {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

fn push_number(out: &mut String, n: Option<f64>) {
    match n {
        Some(n) if n.is_nan() => out.push_str("NaN"),
        Some(n) if n.is_infinite() => out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" }),
        Some(n) if n == n.trunc() && n.abs() < 1e21 => {
            let _ = write!(out, "{}", n as i128);
        }
        Some(n) => {
            let _ = write!(out, "{}", n);
        }
        None => out.push_str("NaN"),
    }
}

fn to_number(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_integer(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => n.as_f64().map(f64::trunc),
        Value::String(s) => leading_number(s, false).map(f64::trunc),
        _ => None,
    }
}

fn to_float(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s, true),
        _ => None,
    }
}

/// Parses the longest numeric prefix of `s`, the way `parseInt`/`parseFloat` do.
fn leading_number(s: &str, fractional: bool) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if fractional && end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let number = &s[..end];
    if !number[digits_start..].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse::<f64>().ok()
}
