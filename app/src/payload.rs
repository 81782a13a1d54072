//! Request and response bodies.
//!
//! Everything on the wire is wrapped as `{"data": ...}`. Incoming data is
//! kept as loose JSON until the validation chain has had a look at it,
//! since most of the checks are about shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn of(data: T) -> Self {
        Envelope { data }
    }
}

/// The object found under `data` in a request body. Missing or non-object
/// data is treated as an empty object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

/// Whether a value counts as "present": null, false, zero and the empty
/// string do not.
pub fn truthy(val: &Value) -> bool {
    match val {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numbers that have no fractional part, including ones written as `2.0`.
/// Anything outside the range of a 64 bit integer is not one we can hold.
pub fn as_integer(val: &Value) -> Option<i128> {
    let n = match val {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(i) = n.as_i64() {
        return Some(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.into());
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < U64_LIMIT)
        .map(|f| f as i128)
}

const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Reads a value as a number the way a loose comparison would: numeric
/// strings and booleans count, blank strings are zero.
pub fn loose_number(val: &Value) -> Option<f64> {
    match val {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match s.trim() {
            "" => Some(0.0),
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            s => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl Payload {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).map(truthy).unwrap_or(false)
    }

    pub fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The payload's own `id`, if it carries a meaningful one. It is left
    /// as JSON so that `17` and `"17"` stay different ids.
    pub fn id(&self) -> Option<&Value> {
        self.get("id").filter(|id| truthy(id))
    }
}

impl From<Value> for Payload {
    fn from(val: Value) -> Self {
        match val {
            Value::Object(fields) => Payload { fields },
            _ => Payload::default(),
        }
    }
}

impl From<Envelope<Value>> for Payload {
    fn from(env: Envelope<Value>) -> Self {
        Payload::from(env.data)
    }
}
