//! ScriptValue — the engine-side dynamic value representation.
//!
//! This is the interface the bridge programs against; the engine's own
//! parser, interpreter, and collector stay behind it. Heap values (strings,
//! arrays, objects, functions) are reference-counted, so a clone held by the
//! callback table is the durable reference that keeps a script function
//! alive across host round-trips.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::exception::ScriptException;

/// Property map backing a script object. Keys are kept sorted, so JSON
/// encodings are deterministic.
pub type ScriptObject = BTreeMap<String, ScriptValue>;

/// A callable script function.
///
/// Native intrinsics and engine-provided closures share this representation;
/// the bridge never distinguishes them.
#[derive(Clone)]
pub struct ScriptFunction {
    inner: Rc<dyn Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptException>>,
}

impl ScriptFunction {
    /// Wrap a callable.
    pub fn new(f: impl Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptException> + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Call the function with the given arguments.
    pub fn call(&self, args: &[ScriptValue]) -> Result<ScriptValue, ScriptException> {
        (self.inner)(args)
    }

    /// Identity comparison (two clones of the same function are equal).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptFunction({:p})", Rc::as_ptr(&self.inner))
    }
}

/// A dynamic script-engine value.
#[derive(Clone, Debug)]
pub enum ScriptValue {
    /// The engine's `undefined`
    Undefined,
    /// The engine's `null`
    Null,
    /// Boolean
    Bool(bool),
    /// All script numbers are 64-bit floats
    Number(f64),
    /// Immutable string
    String(Rc<str>),
    /// Shared mutable array
    Array(Rc<RefCell<Vec<ScriptValue>>>),
    /// Shared mutable object (string-keyed property map)
    Object(Rc<RefCell<ScriptObject>>),
    /// Callable function
    Function(ScriptFunction),
}

impl ScriptValue {
    /// Build a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        ScriptValue::String(Rc::from(s.as_ref()))
    }

    /// Build an array value.
    pub fn array(items: impl IntoIterator<Item = ScriptValue>) -> Self {
        ScriptValue::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Build an object value from key/value pairs.
    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, ScriptValue)>) -> Self {
        ScriptValue::Object(Rc::new(RefCell::new(
            props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Build a function value from a Rust callable.
    pub fn function(
        f: impl Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptException> + 'static,
    ) -> Self {
        ScriptValue::Function(ScriptFunction::new(f))
    }

    /// True for `undefined` and `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    /// True when the value can be called.
    pub fn is_callable(&self) -> bool {
        matches!(self, ScriptValue::Function(_))
    }

    /// Boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer coercion for boundary parameters (handles, call kinds,
    /// binding ids). Numbers truncate toward zero saturating at the i32
    /// range; booleans coerce to 0/1; everything else is not an integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ScriptValue::Number(n) => Some(*n as i32),
            ScriptValue::Bool(b) => Some(*b as i32),
            _ => None,
        }
    }

    /// String payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The function, if this value is callable.
    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            ScriptValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Read a property from an object value. Returns `None` for missing
    /// properties and for non-object values.
    pub fn get(&self, key: &str) -> Option<ScriptValue> {
        match self {
            ScriptValue::Object(props) => props.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Write a property on an object value. Returns `false` (and does
    /// nothing) for non-object values.
    pub fn set(&self, key: impl Into<String>, value: ScriptValue) -> bool {
        match self {
            ScriptValue::Object(props) => {
                props.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Element count, if this is an array.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            ScriptValue::Array(items) => Some(items.borrow().len()),
            _ => None,
        }
    }

    /// Engine ToString conventions, used by `console.*` and the evaluation
    /// result buffer.
    pub fn to_display_string(&self) -> String {
        match self {
            ScriptValue::Undefined => "undefined".to_string(),
            ScriptValue::Null => "null".to_string(),
            ScriptValue::Bool(b) => b.to_string(),
            ScriptValue::Number(n) => format_number(*n),
            ScriptValue::String(s) => s.to_string(),
            ScriptValue::Array(items) => {
                let items = items.borrow();
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| {
                        // Array ToString renders nullish elements as empty.
                        if item.is_nullish() {
                            String::new()
                        } else {
                            item.to_display_string()
                        }
                    })
                    .collect();
                parts.join(",")
            }
            ScriptValue::Object(_) => "[object Object]".to_string(),
            ScriptValue::Function(_) => "function".to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // Integral values print without a fractional suffix, engine-style.
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b)) => a == b,
            (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
            (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
            (ScriptValue::Array(a), ScriptValue::Array(b)) => *a.borrow() == *b.borrow(),
            (ScriptValue::Object(a), ScriptValue::Object(b)) => *a.borrow() == *b.borrow(),
            (ScriptValue::Function(a), ScriptValue::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
