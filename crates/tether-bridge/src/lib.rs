//! Script-side half of the Tether interop bridge.
//!
//! This crate owns everything that lives with the script engine: the
//! dynamic [`ScriptValue`] model, the boundary codec in [`convert`], the
//! shape detectors in [`shape`], the bounded callback table, the invoke
//! and zero-allocation intrinsics, and the [`Context`] that wires them
//! onto a global object. The host side plugs in through [`HostHooks`]
//! at construction time and an [`Evaluator`] for source evaluation.
//!
//! Boundary record types live in the `tether-interop` crate and are
//! re-exported here for convenience.

#![warn(missing_docs)]

pub mod callbacks;
pub mod context;
pub mod convert;
pub(crate) mod dispatch;
pub mod engine;
pub mod exception;
pub mod host;
pub mod json;
pub mod shape;
pub mod value;
pub mod zeroalloc;

pub use callbacks::{CallbackRegistry, SlotTable, DEFAULT_CAPACITY};
pub use context::Context;
pub use engine::{EvalError, EvalMode, EvalStatus, Evaluator};
pub use exception::{format_exception_into, write_cstr, ScriptException, UNKNOWN_EXCEPTION};
pub use host::HostHooks;
pub use value::{ScriptFunction, ScriptObject, ScriptValue};

pub use tether_interop::{
    BridgeError, CallKind, CallbackHandle, InteropValue, InvokeRequest, InvokeResult,
    OwnedInteropValue, ValueTag, Vec4, VectorHint,
};
