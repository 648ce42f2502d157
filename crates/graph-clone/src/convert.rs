//! Bridge between value graphs and plain `serde_json` trees.
//!
//! `From<&Value>` is the lossless direction: a JSON tree becomes a graph of
//! objects, arrays, and primitives (JSON has no map, set, tuple, or leaf
//! categories, so none are produced).
//!
//! # Round-Trip Warning
//!
//! [`to_json`] is the lossy direction. Sets and tuples flatten to arrays,
//! maps to objects with stringified keys, dates to epoch milliseconds,
//! patterns to their source text, boxed primitives to their primitives,
//! errors to their message, tokens to their description (or null). Aliasing
//! is not representable in a tree, so shared containers are duplicated and a
//! cycle's revisiting edge becomes null. `Value -> GraphValue -> Value` is
//! stable; the reverse direction is not.

use std::collections::HashSet;
use std::rc::Rc;

use serde_json::{Map, Number, Value};

use crate::value::GraphValue;

impl From<&Value> for GraphValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => GraphValue::Null,
            Value::Bool(b) => GraphValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => GraphValue::Int(i),
                None => GraphValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => GraphValue::Str(s.clone()),
            Value::Array(arr) => GraphValue::arr_from(arr.iter().map(GraphValue::from)),
            Value::Object(obj) => {
                GraphValue::obj_from(obj.iter().map(|(k, v)| (k.clone(), GraphValue::from(v))))
            }
        }
    }
}

/// Render a value graph as a plain JSON tree.
///
/// See the module docs for what this flattens; the revisiting edge of a
/// cycle renders as null.
///
/// # Examples
///
/// ```
/// use graph_clone::{to_json, GraphValue};
/// use serde_json::json;
///
/// let v = GraphValue::obj_from([
///     ("when", GraphValue::date(1000)),
///     ("who", GraphValue::wrap_str("ada")),
/// ]);
/// assert_eq!(to_json(&v), json!({"when": 1000, "who": "ada"}));
/// ```
pub fn to_json(value: &GraphValue) -> Value {
    let mut on_path = HashSet::new();
    to_json_inner(value, &mut on_path)
}

fn to_json_inner(value: &GraphValue, on_path: &mut HashSet<usize>) -> Value {
    match value {
        GraphValue::Null => Value::Null,
        GraphValue::Bool(b) => Value::Bool(*b),
        GraphValue::Int(i) => Value::Number((*i).into()),
        GraphValue::Float(x) => Number::from_f64(*x).map_or(Value::Null, Value::Number),
        GraphValue::Str(s) => Value::String(s.clone()),

        GraphValue::Obj(rc) => {
            let id = Rc::as_ptr(rc) as usize;
            if !on_path.insert(id) {
                return Value::Null;
            }
            let entries = rc.borrow();
            let mut out = Map::new();
            for (key, val) in entries.iter() {
                out.insert(key.clone(), to_json_inner(val, on_path));
            }
            on_path.remove(&id);
            Value::Object(out)
        }

        GraphValue::Arr(rc) | GraphValue::Set(rc) | GraphValue::Tup(rc) => {
            let id = Rc::as_ptr(rc) as usize;
            if !on_path.insert(id) {
                return Value::Null;
            }
            let items = rc.borrow();
            let out = items.iter().map(|item| to_json_inner(item, on_path)).collect();
            on_path.remove(&id);
            Value::Array(out)
        }

        GraphValue::Map(rc) => {
            let id = Rc::as_ptr(rc) as usize;
            if !on_path.insert(id) {
                return Value::Null;
            }
            let entries = rc.borrow();
            let mut out = Map::new();
            for (key, val) in entries.iter() {
                out.insert(key_string(key), to_json_inner(val, on_path));
            }
            on_path.remove(&id);
            Value::Object(out)
        }

        GraphValue::Date(d) => Value::Number(d.epoch_ms().into()),
        GraphValue::Pattern(p) => Value::String(p.source().to_string()),
        GraphValue::WrapBool(b) => Value::Bool(**b),
        GraphValue::WrapNum(n) => Number::from_f64(**n).map_or(Value::Null, Value::Number),
        GraphValue::WrapStr(s) => Value::String(s.as_ref().clone()),
        GraphValue::Error(e) => Value::String(e.message().to_string()),
        GraphValue::Token(t) => t
            .description()
            .map_or(Value::Null, |d| Value::String(d.to_string())),
    }
}

/// Stringify a map key for the object rendering. Primitive keys use their
/// value text; reference keys fall back to their debug form. Colliding
/// strings overwrite.
fn key_string(key: &GraphValue) -> String {
    match key {
        GraphValue::Null => "null".to_string(),
        GraphValue::Bool(b) => b.to_string(),
        GraphValue::Int(i) => i.to_string(),
        GraphValue::Float(x) => x.to_string(),
        GraphValue::Str(s) => s.clone(),
        other => format!("{:?}", other),
    }
}
