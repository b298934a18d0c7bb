//! ScriptException — diagnostics for script-level failures.
//!
//! An exception carries an optional message and an optional stack trace.
//! [`format_exception_into`] composes the bounded report handed across the
//! native boundary: message + newline + stack when both fit, otherwise the
//! message, otherwise the stack, otherwise a fixed placeholder. The
//! destination buffer is always NUL-terminated and never overflows.

use std::fmt;

use crate::value::ScriptValue;

/// Report emitted when an exception carries neither message nor stack.
pub const UNKNOWN_EXCEPTION: &str = "Unknown script exception";

/// A script-level exception surfaced at the bridge boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
    /// Human-readable error message
    pub message: Option<String>,
    /// Engine-formatted stack trace
    pub stack: Option<String>,
}

impl ScriptException {
    /// An exception with a message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            stack: None,
        }
    }

    /// A caller-error exception, engine TypeError style.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(format!("TypeError: {}", message.into()))
    }

    /// An exception with both message and stack.
    pub fn with_stack(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            stack: Some(stack.into()),
        }
    }

    /// Extract an exception from a thrown script value: strings become the
    /// message, exception-shaped objects contribute their `message` and
    /// `stack` properties, anything else is stringified.
    pub fn from_value(value: &ScriptValue) -> Self {
        match value {
            ScriptValue::String(s) => Self::new(s.to_string()),
            ScriptValue::Object(_) => {
                let message = value.get("message").and_then(|v| match v {
                    ScriptValue::String(s) => Some(s.to_string()),
                    _ => None,
                });
                let stack = value.get("stack").and_then(|v| match v {
                    ScriptValue::String(s) => Some(s.to_string()),
                    _ => None,
                });
                Self { message, stack }
            }
            other => Self::new(other.to_display_string()),
        }
    }

    /// The unbounded report string (message + stack when both are present).
    pub fn report(&self) -> String {
        match (self.non_empty_message(), self.non_empty_stack()) {
            (Some(msg), Some(stack)) => format!("{msg}\n{stack}"),
            (Some(msg), None) => msg.to_string(),
            (None, Some(stack)) => stack.to_string(),
            (None, None) => UNKNOWN_EXCEPTION.to_string(),
        }
    }

    fn non_empty_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|s| !s.is_empty())
    }

    fn non_empty_stack(&self) -> Option<&str> {
        self.stack.as_deref().filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ScriptException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl std::error::Error for ScriptException {}

/// Compose the bounded exception report into `out`.
///
/// Returns the number of content bytes written (excluding the terminator).
/// The combined message + stack form is used only when it fits whole;
/// otherwise the message (or, failing that, the stack) is written and
/// truncated to fit. An empty buffer receives nothing.
pub fn format_exception_into(exc: &ScriptException, out: &mut [u8]) -> usize {
    if out.is_empty() {
        return 0;
    }
    match (exc.non_empty_message(), exc.non_empty_stack()) {
        (Some(msg), Some(stack)) => {
            // +1 newline, +1 terminator
            if msg.len() + 1 + stack.len() + 1 <= out.len() {
                write_cstr(out, &format!("{msg}\n{stack}"))
            } else {
                write_cstr(out, msg)
            }
        }
        (Some(msg), None) => write_cstr(out, msg),
        (None, Some(stack)) => write_cstr(out, stack),
        (None, None) => write_cstr(out, UNKNOWN_EXCEPTION),
    }
}

/// Copy `s` into `out` as a NUL-terminated byte string, truncating on a
/// UTF-8 boundary when it does not fit. Returns the content length written.
pub fn write_cstr(out: &mut [u8], s: &str) -> usize {
    if out.is_empty() {
        return 0;
    }
    let mut end = s.len().min(out.len() - 1);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    out[..end].copy_from_slice(&s.as_bytes()[..end]);
    out[end] = 0;
    end
}
