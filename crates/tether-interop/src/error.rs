//! Boundary error taxonomy.

use thiserror::Error;

/// Errors reported at the script/host boundary.
///
/// Each variant maps to a stable negative status code via [`code`]
/// (`BridgeError::code`); `0` is reserved for success. Conversion-layer
/// failures never surface here — unrecognized values degrade to `Null` by
/// design — so this taxonomy covers dispatch, lifecycle, and handle faults
/// only.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// The bridge instance was destroyed, never created, or is missing a
    /// required collaborator (e.g. an evaluator).
    #[error("invalid or destroyed bridge context")]
    InvalidContext,

    /// A callback handle is out of range or refers to a reused slot from an
    /// earlier generation.
    #[error("invalid callback handle {0}")]
    InvalidHandle(i32),

    /// The referenced callback slot holds no callable.
    #[error("callback slot is not a function")]
    NotFunction,

    /// A native-side allocation failed.
    #[error("native allocation failed")]
    OutOfMemory,

    /// A script-level exception surfaced during evaluation or callback
    /// invocation; carries the formatted diagnostic.
    #[error("script exception: {message}")]
    Exception {
        /// The formatted message + stack report
        message: String,
    },

    /// The callback table has no free slot left.
    #[error("callback table full ({capacity} slots)")]
    TableFull {
        /// Table capacity at the time of the failed registration
        capacity: usize,
    },
}

impl BridgeError {
    /// The stable status code for this error.
    ///
    /// `TableFull` is a bridge extension; the reference protocol surfaced
    /// table exhaustion as a script error without a dedicated code.
    pub fn code(&self) -> i32 {
        match self {
            BridgeError::InvalidContext => -1,
            BridgeError::InvalidHandle(_) => -2,
            BridgeError::NotFunction => -3,
            BridgeError::OutOfMemory => -4,
            BridgeError::Exception { .. } => -5,
            BridgeError::TableFull { .. } => -6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(BridgeError::InvalidContext.code(), -1);
        assert_eq!(BridgeError::InvalidHandle(9).code(), -2);
        assert_eq!(BridgeError::NotFunction.code(), -3);
        assert_eq!(BridgeError::OutOfMemory.code(), -4);
        assert_eq!(
            BridgeError::Exception {
                message: "boom".into()
            }
            .code(),
            -5
        );
        assert_eq!(BridgeError::TableFull { capacity: 4096 }.code(), -6);
    }

    #[test]
    fn messages_name_the_fault() {
        let err = BridgeError::InvalidHandle(17);
        assert!(err.to_string().contains("17"));
        let err = BridgeError::TableFull { capacity: 8 };
        assert!(err.to_string().contains("8"));
    }
}
