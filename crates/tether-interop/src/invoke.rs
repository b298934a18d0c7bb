//! Named-member invocation protocol records.

use std::borrow::Cow;

use crate::value::{InteropValue, OwnedInteropValue};

/// What kind of member access an [`InvokeRequest`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CallKind {
    /// Construct an instance of the named type
    Constructor = 0,
    /// Invoke a method
    Method = 1,
    /// Read a property
    GetProp = 2,
    /// Write a property
    SetProp = 3,
    /// Read a field
    GetField = 4,
    /// Write a field
    SetField = 5,
    /// Query whether the named type exists
    TypeExists = 6,
    /// Query whether the named type is an enum
    IsEnumType = 7,
}

impl CallKind {
    /// Decode a wire call-kind integer.
    pub fn from_i32(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => CallKind::Constructor,
            1 => CallKind::Method,
            2 => CallKind::GetProp,
            3 => CallKind::SetProp,
            4 => CallKind::GetField,
            5 => CallKind::SetField,
            6 => CallKind::TypeExists,
            7 => CallKind::IsEnumType,
            _ => return None,
        })
    }

    /// The wire encoding of this call kind.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A named-member invocation handed to the host reflection layer.
///
/// Request records are stack-scoped per call; the argument vector is built
/// for the call duration and dropped (payloads included) as soon as dispatch
/// returns.
#[derive(Debug, Clone)]
pub struct InvokeRequest<'a> {
    /// Fully qualified host type name
    pub type_name: Cow<'a, str>,
    /// Member name within the type (ignored for `TypeExists`/`IsEnumType`)
    pub member_name: Cow<'a, str>,
    /// The kind of member access
    pub call_kind: CallKind,
    /// Static member (no target instance) vs. instance member
    pub is_static: bool,
    /// Handle of the target instance; `0` for static access
    pub target_handle: i32,
    /// Converted call arguments
    pub args: Vec<InteropValue<'a>>,
}

/// The host's reply to an [`InvokeRequest`] or a zero-allocation dispatch.
///
/// `error_code == 0` means success; any other code aborts the call and
/// surfaces `error_message` (or a generic fallback) to the script caller.
#[derive(Debug, Clone, Default)]
pub struct InvokeResult {
    /// The returned value; `Null` for void members
    pub return_value: OwnedInteropValue,
    /// `0` on success, non-zero on failure
    pub error_code: i32,
    /// Optional human-readable failure description
    pub error_message: Option<String>,
}

impl InvokeResult {
    /// A successful result carrying `value`.
    pub fn ok(value: OwnedInteropValue) -> Self {
        Self {
            return_value: value,
            error_code: 0,
            error_message: None,
        }
    }

    /// A failed result with a status code and message.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            return_value: InteropValue::Null,
            error_code: if code == 0 { -1 } else { code },
            error_message: Some(message.into()),
        }
    }

    /// True when the host reported success.
    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_kind_round_trip() {
        for raw in 0..8 {
            let kind = CallKind::from_i32(raw).unwrap();
            assert_eq!(kind.as_i32(), raw);
        }
        assert_eq!(CallKind::from_i32(8), None);
        assert_eq!(CallKind::from_i32(-1), None);
    }

    #[test]
    fn error_result_never_reports_code_zero() {
        let res = InvokeResult::error(0, "bad");
        assert!(!res.is_ok());
        assert_eq!(res.error_code, -1);
    }

    #[test]
    fn ok_result_carries_value() {
        let res = InvokeResult::ok(InteropValue::Int32(7));
        assert!(res.is_ok());
        assert_eq!(res.return_value, InteropValue::Int32(7));
        assert!(res.error_message.is_none());
    }
}
