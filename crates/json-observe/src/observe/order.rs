//! Total order over JSON values used by the default sequence sort.
//!
//! Values order by type first (null, booleans, numbers, strings, arrays,
//! objects), then within a type by natural value. Arrays compare
//! elementwise, then by length. Objects compare by size, then by key
//! (shorter keys first, ties lexicographic), then by the values under
//! those keys.

use serde_json::Value;
use std::cmp::Ordering;

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn key_cmp(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two JSON values under the canonical order.
///
/// Numbers compare numerically, not by their text form. Numbers that fall
/// outside `f64` range compare equal.
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (ax, bx) in x.iter().zip(y.iter()) {
                let ord = cmp_values(ax, bx);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let by_len = x.len().cmp(&y.len());
            if by_len != Ordering::Equal {
                return by_len;
            }
            for ((ka, va), (kb, vb)) in x.iter().zip(y.iter()) {
                let by_key = key_cmp(ka, kb);
                if by_key != Ordering::Equal {
                    return by_key;
                }
                let by_value = cmp_values(va, vb);
                if by_value != Ordering::Equal {
                    return by_value;
                }
            }
            Ordering::Equal
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
