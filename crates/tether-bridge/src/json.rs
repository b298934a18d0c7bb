//! JSON fallback encoding for plain script objects.
//!
//! Mirrors the engine's structured serialization: function- and
//! undefined-valued properties are omitted, such values inside arrays become
//! `null`, non-finite numbers become `null`, and cyclic structures fail to
//! encode (the caller degrades the value to `Null`).

use std::rc::Rc;

use serde_json::{Map, Number, Value};

use crate::value::ScriptValue;

/// Serialize a script value to a JSON string.
///
/// Returns `None` when the value cannot be encoded: top-level `undefined` or
/// functions, or any cycle through arrays/objects.
pub fn to_json(value: &ScriptValue) -> Option<String> {
    let mut visiting = Vec::new();
    let encoded = encode(value, &mut visiting)?;
    serde_json::to_string(&encoded).ok()
}

fn encode(value: &ScriptValue, visiting: &mut Vec<usize>) -> Option<Value> {
    match value {
        ScriptValue::Undefined | ScriptValue::Function(_) => None,
        ScriptValue::Null => Some(Value::Null),
        ScriptValue::Bool(b) => Some(Value::Bool(*b)),
        ScriptValue::Number(n) => Some(encode_number(*n)),
        ScriptValue::String(s) => Some(Value::String(s.to_string())),
        ScriptValue::Array(items) => {
            let addr = Rc::as_ptr(items) as usize;
            if visiting.contains(&addr) {
                return None;
            }
            visiting.push(addr);
            let items = items.borrow();
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                // Unencodable elements serialize as null inside arrays.
                match encode(item, visiting) {
                    Some(v) => out.push(v),
                    None if matches!(item, ScriptValue::Undefined | ScriptValue::Function(_)) => {
                        out.push(Value::Null)
                    }
                    None => {
                        visiting.pop();
                        return None;
                    }
                }
            }
            visiting.pop();
            Some(Value::Array(out))
        }
        ScriptValue::Object(props) => {
            let addr = Rc::as_ptr(props) as usize;
            if visiting.contains(&addr) {
                return None;
            }
            visiting.push(addr);
            let props = props.borrow();
            let mut out = Map::new();
            for (key, prop) in props.iter() {
                match encode(prop, visiting) {
                    Some(v) => {
                        out.insert(key.clone(), v);
                    }
                    // Function/undefined properties are skipped outright.
                    None if matches!(prop, ScriptValue::Undefined | ScriptValue::Function(_)) => {}
                    None => {
                        visiting.pop();
                        return None;
                    }
                }
            }
            visiting.pop();
            Some(Value::Object(out))
        }
    }
}

fn encode_number(n: f64) -> Value {
    match Number::from_f64(n) {
        Some(num) => Value::Number(num),
        None => Value::Null,
    }
}
