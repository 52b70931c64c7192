//! Encoded fragments and payload path helpers
//!
//! A [`Fragment`] is the part of a vendor payload that one aspect renders.
//! Decoders walk raw payloads with [`lookup`]; a missing intermediate key is
//! an ordinary `None`, never a panic.

use serde_json::{Map, Value};

/// One aspect's share of a vendor payload
pub type Fragment = Map<String, Value>;

/// Follow `path` through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.as_object()?.get(*key))
}

/// String at `path`
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// Boolean at `path`
pub fn lookup_bool(value: &Value, path: &[&str]) -> Option<bool> {
    lookup(value, path).and_then(Value::as_bool)
}

/// Unsigned integer at `path`; anything else counts as absent
pub fn lookup_u32(value: &Value, path: &[&str]) -> Option<u32> {
    lookup(value, path).and_then(as_u32)
}

/// Signed integer at `path`; anything else counts as absent
pub fn lookup_i64(value: &Value, path: &[&str]) -> Option<i64> {
    lookup(value, path).and_then(Value::as_i64)
}

/// Number at `path`; integers are widened
pub fn lookup_f64(value: &Value, path: &[&str]) -> Option<f64> {
    lookup(value, path).and_then(Value::as_f64)
}

/// Unsigned integer that fits in 32 bits
pub fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Unsigned integer that web UIs may also send as a decimal string
pub fn as_u32_or_numeric_str(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => as_u32(other),
    }
}

/// Build `{path[0]: {path[1]: ... leaf}}`
///
/// An empty path is not meaningful for fragments; callers always pass at
/// least one key.
pub fn nested(path: &[&str], leaf: Value) -> Fragment {
    let mut frag = Fragment::new();
    if let Some((first, rest)) = path.split_first() {
        let inner = rest.iter().rev().fold(leaf, |inner, key| {
            let mut table = Fragment::new();
            table.insert((*key).to_string(), inner);
            Value::Object(table)
        });
        frag.insert((*first).to_string(), inner);
    }
    frag
}

/// Insert `key` only when there is a value to emit
pub fn insert_some<T: Into<Value>>(frag: &mut Fragment, key: &str, value: Option<T>) {
    if let Some(value) = value {
        frag.insert(key.to_string(), value.into());
    }
}
