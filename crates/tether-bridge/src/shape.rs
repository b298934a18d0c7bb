//! Structural shape detection for geometry and color objects.
//!
//! The highest-frequency values exchanged with a real-time host are 3D
//! transforms and colors, so objects shaped like `{x,y,z[,w]}` or
//! `{r,g,b[,a]}` are packed into the binary vector variants instead of
//! falling back to JSON. Vector detection runs before color detection, so
//! an object exposing both property sets is classified as a vector.

use tether_interop::{InteropValue, OwnedInteropValue};

use crate::value::ScriptValue;

/// Run both detectors in priority order (vector, then color).
pub fn detect(value: &ScriptValue) -> Option<OwnedInteropValue> {
    detect_vector(value).or_else(|| detect_color(value))
}

/// Detect `{x,y,z}` (Vector3) and `{x,y,z,w}` (Vector4/quaternion) shapes.
///
/// All three of `x`, `y`, `z` must be numeric; `w` upgrades the result to a
/// 4-component record with no type hint.
pub fn detect_vector(value: &ScriptValue) -> Option<OwnedInteropValue> {
    let x = numeric_prop(value, "x")?;
    let y = numeric_prop(value, "y")?;
    let z = numeric_prop(value, "z")?;

    match numeric_prop(value, "w") {
        Some(w) => Some(InteropValue::vector4(x, y, z, w)),
        None => Some(InteropValue::vector3(x, y, z)),
    }
}

/// Detect `{r,g,b[,a]}` color shapes.
///
/// `a` is optional and defaults to 1.0. Always yields a 4-component record
/// carrying the `"color"` hint so the host can tell it apart from a
/// quaternion with the same wire layout.
pub fn detect_color(value: &ScriptValue) -> Option<OwnedInteropValue> {
    let r = numeric_prop(value, "r")?;
    let g = numeric_prop(value, "g")?;
    let b = numeric_prop(value, "b")?;
    let a = numeric_prop(value, "a").unwrap_or(1.0);

    Some(InteropValue::color(r, g, b, a))
}

// Numbers and booleans are the shapes the engine's ToNumber cannot fail on.
fn numeric_prop(value: &ScriptValue, key: &str) -> Option<f32> {
    match value.get(key)? {
        ScriptValue::Number(n) => Some(n as f32),
        ScriptValue::Bool(b) => Some(b as i32 as f32),
        _ => None,
    }
}
