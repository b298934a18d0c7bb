//! InteropValue — the tagged value record crossing the script/host boundary.
//!
//! Each variant maps to a fixed wire tag ([`ValueTag`]) so that hosts reading
//! the record over an ABI see a stable discriminant regardless of how the
//! Rust side evolves. String payloads are `Cow<str>`: `Cow::Owned` is the
//! heap-copy mode used by the general invoke path, `Cow::Borrowed` the
//! non-owning mode used by the zero-allocation path, where the reference is
//! only valid for the duration of the producing call.

use std::borrow::Cow;

/// The type-hint literal marking a `Vector4` payload as a color.
pub const COLOR_HINT: &str = "color";

/// Wire tag for each [`InteropValue`] variant.
///
/// The numbering is part of the boundary contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ValueTag {
    /// Absent / unrecognized value
    Null = 0,
    /// Boolean
    Bool = 1,
    /// 32-bit signed integer
    Int32 = 2,
    /// 64-bit float
    Double = 3,
    /// UTF-8 string
    String = 4,
    /// Opaque host object handle
    ObjectHandle = 5,
    /// 64-bit signed integer
    Int64 = 6,
    /// 32-bit float
    Float32 = 7,
    /// Array descriptor (length only, elements do not cross)
    Array = 8,
    /// JSON-encoded object (script→host direction only)
    JsonObject = 9,
    /// Packed x,y,z floats (fourth lane zeroed)
    Vector3 = 10,
    /// Packed x,y,z,w floats (quaternion, 4-vector, or color)
    Vector4 = 11,
}

/// Four packed float lanes, the binary payload of `Vector3`/`Vector4`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec4 {
    /// x lane (r for colors)
    pub x: f32,
    /// y lane (g for colors)
    pub y: f32,
    /// z lane (b for colors)
    pub z: f32,
    /// w lane (a for colors; zero for Vector3)
    pub w: f32,
}

impl Vec4 {
    /// Pack four lanes.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// Disambiguates `Vector4` payloads that share the same wire layout.
///
/// On the wire this is the optional `typeHint` string annotation; only the
/// literal `"color"` is currently defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorHint {
    /// Quaternion or generic 4-vector; no hint emitted.
    #[default]
    Generic,
    /// Color channels (r,g,b,a); emitted as the hint `"color"`.
    Color,
}

/// A value crossing the script/host boundary.
///
/// The lifetime parameter scopes borrowed string payloads to the call that
/// produced them; `InteropValue<'static>` (see [`OwnedInteropValue`]) owns
/// all of its payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteropValue<'a> {
    /// Absent value. Unrecognized script shapes degrade to this.
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit float
    Double(f64),
    /// UTF-8 string
    String(Cow<'a, str>),
    /// Opaque handle to a host-owned object, with an optional class-name
    /// hint the script side attaches to the wrapping object.
    Handle {
        /// The host-issued handle id
        handle: i32,
        /// Host type name, if known
        class: Option<Cow<'a, str>>,
    },
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit float
    Float32(f32),
    /// Array descriptor: length only. Elements do not cross in this record;
    /// retrieving them requires a follow-up invocation per element.
    Array {
        /// Element count of the script array
        len: i32,
    },
    /// JSON-encoded object (script→host only; the reverse direction treats
    /// this as a plain string fallback).
    Json(Cow<'a, str>),
    /// Packed x,y,z floats; the fourth lane is always zero.
    Vector3(Vec4),
    /// Packed x,y,z,w floats, disambiguated by [`VectorHint`].
    Vector4 {
        /// The packed lanes
        vec: Vec4,
        /// Color vs. generic 4-vector
        hint: VectorHint,
    },
}

/// An [`InteropValue`] that owns all of its payloads.
pub type OwnedInteropValue = InteropValue<'static>;

impl<'a> InteropValue<'a> {
    /// Build an owned string value.
    pub fn string(s: impl Into<Cow<'a, str>>) -> Self {
        InteropValue::String(s.into())
    }

    /// Build a JSON-object value from an already-encoded string.
    pub fn json(s: impl Into<Cow<'a, str>>) -> Self {
        InteropValue::Json(s.into())
    }

    /// Build an object handle with no class hint.
    pub fn handle(handle: i32) -> Self {
        InteropValue::Handle {
            handle,
            class: None,
        }
    }

    /// Build a 3-component vector (fourth lane zeroed).
    pub fn vector3(x: f32, y: f32, z: f32) -> Self {
        InteropValue::Vector3(Vec4::new(x, y, z, 0.0))
    }

    /// Build a generic 4-component vector.
    pub fn vector4(x: f32, y: f32, z: f32, w: f32) -> Self {
        InteropValue::Vector4 {
            vec: Vec4::new(x, y, z, w),
            hint: VectorHint::Generic,
        }
    }

    /// Build a color (4 lanes with the `"color"` hint).
    pub fn color(r: f32, g: f32, b: f32, a: f32) -> Self {
        InteropValue::Vector4 {
            vec: Vec4::new(r, g, b, a),
            hint: VectorHint::Color,
        }
    }

    /// The stable wire tag for this variant.
    pub fn tag(&self) -> ValueTag {
        match self {
            InteropValue::Null => ValueTag::Null,
            InteropValue::Bool(_) => ValueTag::Bool,
            InteropValue::Int32(_) => ValueTag::Int32,
            InteropValue::Double(_) => ValueTag::Double,
            InteropValue::String(_) => ValueTag::String,
            InteropValue::Handle { .. } => ValueTag::ObjectHandle,
            InteropValue::Int64(_) => ValueTag::Int64,
            InteropValue::Float32(_) => ValueTag::Float32,
            InteropValue::Array { .. } => ValueTag::Array,
            InteropValue::Json(_) => ValueTag::JsonObject,
            InteropValue::Vector3(_) => ValueTag::Vector3,
            InteropValue::Vector4 { .. } => ValueTag::Vector4,
        }
    }

    /// The optional `typeHint` annotation for this value, as it appears on
    /// the wire (`"color"` for color vectors, the class name for handles).
    pub fn type_hint(&self) -> Option<&str> {
        match self {
            InteropValue::Vector4 {
                hint: VectorHint::Color,
                ..
            } => Some(COLOR_HINT),
            InteropValue::Handle {
                class: Some(class), ..
            } => Some(class),
            _ => None,
        }
    }

    /// True for the `Null` variant.
    pub fn is_null(&self) -> bool {
        matches!(self, InteropValue::Null)
    }

    /// String payload, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InteropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a value that owns all of its payloads, copying any
    /// borrowed strings.
    pub fn into_owned(self) -> OwnedInteropValue {
        match self {
            InteropValue::Null => InteropValue::Null,
            InteropValue::Bool(b) => InteropValue::Bool(b),
            InteropValue::Int32(i) => InteropValue::Int32(i),
            InteropValue::Double(d) => InteropValue::Double(d),
            InteropValue::String(s) => InteropValue::String(Cow::Owned(s.into_owned())),
            InteropValue::Handle { handle, class } => InteropValue::Handle {
                handle,
                class: class.map(|c| Cow::Owned(c.into_owned())),
            },
            InteropValue::Int64(i) => InteropValue::Int64(i),
            InteropValue::Float32(f) => InteropValue::Float32(f),
            InteropValue::Array { len } => InteropValue::Array { len },
            InteropValue::Json(s) => InteropValue::Json(Cow::Owned(s.into_owned())),
            InteropValue::Vector3(v) => InteropValue::Vector3(v),
            InteropValue::Vector4 { vec, hint } => InteropValue::Vector4 { vec, hint },
        }
    }
}
