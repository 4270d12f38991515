//! `@@if` condition evaluation.
//!
//! Grammar: `ident`, `!ident`, or `ident <op> literal` with `op` one of
//! `===`, `!==`, `==`, `!=`. Identifiers may be dotted (`site.lang`).
//! Undefined identifiers are falsy and equal to nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(!)?\s*([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*(?:(===|!==|==|!=)\s*(.+?))?\s*$")
        .expect("valid condition regex")
});

/// Evaluate a condition against the context. `None` means the condition
/// does not parse.
pub fn evaluate(condition: &str, context: &Map<String, Value>) -> Option<bool> {
    let caps = CONDITION.captures(condition)?;
    let negate = caps.get(1).is_some();
    let value = lookup(context, &caps[2]);

    match (caps.get(3), caps.get(4)) {
        (Some(op), Some(literal)) => {
            if negate {
                return None;
            }
            let literal = parse_literal(literal.as_str())?;
            let equal = value.is_some_and(|v| loosely_equal(v, &literal, op.as_str()));
            Some(if op.as_str().starts_with('!') { !equal } else { equal })
        }
        _ => {
            let truthy = value.is_some_and(is_truthy);
            Some(truthy != negate)
        }
    }
}

/// Resolve a dotted name in the context.
pub fn lookup<'a>(context: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let mut parts = name.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn parse_literal(literal: &str) -> Option<Value> {
    let literal = literal.trim();
    if let Some(inner) = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        return Some(Value::String(inner.to_string()));
    }
    serde_json::from_str(literal).ok()
}

/// `==`/`!=` compare numbers and strings across types (`1 == "1"`);
/// `===`/`!==` require identical JSON values.
fn loosely_equal(value: &Value, literal: &Value, op: &str) -> bool {
    if op.len() == 3 {
        return value == literal;
    }
    match (value, literal) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => value == literal,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
