//! The interop value codec — bidirectional conversion between script-native
//! values and the boundary record.
//!
//! Conversion never fails: script shapes that match no rule silently degrade
//! to `Null`. This is deliberate, documented information loss — the boundary
//! contract favors best-effort delivery over faulting the call.
//!
//! Two script→record modes exist:
//! - [`from_script`] — the general path; string payloads are copied into
//!   owned allocations that outlive the producing call.
//! - [`from_script_borrowed`] — the zero-allocation path; strings borrow the
//!   engine's storage for the duration of the call and there is no JSON
//!   fallback (synthesizing JSON is too costly for the hot path).

use std::borrow::Cow;

use tether_interop::{InteropValue, OwnedInteropValue, VectorHint};

use crate::json;
use crate::shape;
use crate::value::ScriptValue;

/// Property naming an opaque host object handle on a script wrapper object.
pub const HANDLE_PROP: &str = "__csHandle";
/// Property carrying the host class name on a handle wrapper object.
pub const CLASS_PROP: &str = "__csType";
/// Marker properties identifying an explicit host-struct object.
pub const STRUCT_MARKERS: [&str; 2] = ["__struct", "__type"];

/// Convert a script value into an owned boundary record (general path).
pub fn from_script(value: &ScriptValue) -> OwnedInteropValue {
    match value {
        ScriptValue::Undefined | ScriptValue::Null => InteropValue::Null,
        ScriptValue::Bool(b) => InteropValue::Bool(*b),
        ScriptValue::Number(n) => from_number(*n),
        ScriptValue::String(s) => InteropValue::String(Cow::Owned(s.to_string())),
        ScriptValue::Array(items) => InteropValue::Array {
            len: items.borrow().len() as i32,
        },
        ScriptValue::Object(_) => from_object(value),
        ScriptValue::Function(_) => InteropValue::Null,
    }
}

fn from_object(value: &ScriptValue) -> OwnedInteropValue {
    let mut has_handle_marker = false;
    if let Some(raw) = value.get(HANDLE_PROP) {
        if !raw.is_nullish() {
            match raw {
                ScriptValue::Number(n) => return InteropValue::handle(n as i32),
                // A malformed handle marker still disqualifies the plain-
                // object rules below.
                _ => has_handle_marker = true,
            }
        }
    }

    if has_struct_marker(value) {
        if let Some(encoded) = json::to_json(value) {
            // Explicit structs cross as plain JSON strings, not JsonObject.
            return InteropValue::String(Cow::Owned(encoded));
        }
    }

    if has_handle_marker {
        return InteropValue::Null;
    }

    if let Some(packed) = shape::detect(value) {
        return packed;
    }

    match json::to_json(value) {
        Some(encoded) => InteropValue::Json(Cow::Owned(encoded)),
        None => InteropValue::Null,
    }
}

/// Convert a script value into a borrowed boundary record (zero-allocation
/// path). String payloads reference the engine's storage and must not
/// outlive the producing call; plain objects that match no binary shape
/// degrade to `Null` instead of falling back to JSON.
pub fn from_script_borrowed(value: &ScriptValue) -> InteropValue<'_> {
    match value {
        ScriptValue::Undefined | ScriptValue::Null => InteropValue::Null,
        ScriptValue::Bool(b) => InteropValue::Bool(*b),
        ScriptValue::Number(n) => from_number(*n),
        ScriptValue::String(s) => InteropValue::String(Cow::Borrowed(s)),
        ScriptValue::Object(_) => {
            if let Some(raw) = value.get(HANDLE_PROP) {
                if !raw.is_nullish() {
                    return match raw {
                        ScriptValue::Number(n) => InteropValue::handle(n as i32),
                        _ => InteropValue::Null,
                    };
                }
            }
            shape::detect(value).unwrap_or(InteropValue::Null)
        }
        ScriptValue::Array(_) | ScriptValue::Function(_) => InteropValue::Null,
    }
}

// The exact-round-trip test, not magnitude, decides the representation:
// 2.0 becomes Int32(2), 2.5 becomes Double(2.5).
fn from_number(n: f64) -> OwnedInteropValue {
    if n == (n as i32) as f64 {
        InteropValue::Int32(n as i32)
    } else {
        InteropValue::Double(n)
    }
}

/// Convert a boundary record back into a script value (the §-inverse
/// mapping): handles rebuild their wrapper object, vectors rebuild their
/// property shape, `Array` descriptors have no inverse and yield `Null`,
/// and `Json` — a script→host-only type — degrades to a plain string.
pub fn to_script(value: &InteropValue<'_>) -> ScriptValue {
    match value {
        InteropValue::Null => ScriptValue::Null,
        InteropValue::Bool(b) => ScriptValue::Bool(*b),
        InteropValue::Int32(i) => ScriptValue::Number(*i as f64),
        InteropValue::Double(d) => ScriptValue::Number(*d),
        InteropValue::Int64(i) => ScriptValue::Number(*i as f64),
        InteropValue::Float32(f) => ScriptValue::Number(*f as f64),
        InteropValue::String(s) => ScriptValue::string(s),
        InteropValue::Json(s) => ScriptValue::string(s),
        InteropValue::Handle { handle, class } => {
            let obj = ScriptValue::object([(HANDLE_PROP, ScriptValue::Number(*handle as f64))]);
            if let Some(class) = class.as_deref().filter(|c| !c.is_empty()) {
                obj.set(CLASS_PROP, ScriptValue::string(class));
            }
            obj
        }
        InteropValue::Array { .. } => ScriptValue::Null,
        InteropValue::Vector3(v) => ScriptValue::object([
            ("x", ScriptValue::Number(v.x as f64)),
            ("y", ScriptValue::Number(v.y as f64)),
            ("z", ScriptValue::Number(v.z as f64)),
        ]),
        InteropValue::Vector4 { vec, hint } => match hint {
            VectorHint::Color => ScriptValue::object([
                ("r", ScriptValue::Number(vec.x as f64)),
                ("g", ScriptValue::Number(vec.y as f64)),
                ("b", ScriptValue::Number(vec.z as f64)),
                ("a", ScriptValue::Number(vec.w as f64)),
            ]),
            VectorHint::Generic => ScriptValue::object([
                ("x", ScriptValue::Number(vec.x as f64)),
                ("y", ScriptValue::Number(vec.y as f64)),
                ("z", ScriptValue::Number(vec.z as f64)),
                ("w", ScriptValue::Number(vec.w as f64)),
            ]),
        },
    }
}

fn has_struct_marker(value: &ScriptValue) -> bool {
    STRUCT_MARKERS
        .iter()
        .any(|marker| matches!(value.get(marker), Some(v) if !v.is_nullish()))
}
