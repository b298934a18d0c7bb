//! Tether interop records — the wire-level data model shared by the script
//! bridge and the host runtime.
//!
//! This crate defines the fixed, binary-stable records that cross the
//! script/host boundary:
//! - [`InteropValue`] — a tagged value with a stable wire tag per variant
//! - [`InvokeRequest`] / [`InvokeResult`] — the named-member invocation
//!   protocol
//! - [`CallbackHandle`] — generation-tagged handles into the script-side
//!   callback table
//! - [`BridgeError`] — the boundary error taxonomy with stable status codes
//!
//! It carries no engine knowledge; the bridge crate (`tether-bridge`)
//! implements the conversion and dispatch semantics on top of these types.

#![warn(missing_docs)]

mod error;
mod handle;
mod invoke;
mod value;

pub use error::BridgeError;
pub use handle::CallbackHandle;
pub use invoke::{CallKind, InvokeRequest, InvokeResult};
pub use value::{InteropValue, OwnedInteropValue, ValueTag, Vec4, VectorHint, COLOR_HINT};
