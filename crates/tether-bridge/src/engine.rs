//! Pluggable script evaluation seam.
//!
//! The bridge owns the globals, the callback table, and the boundary
//! codec; it does not own a parser. Embedders plug an [`Evaluator`] into
//! the context, and the context routes `eval` requests through it with
//! the bridge's globals visible to the evaluated code.

use thiserror::Error;

use crate::exception::ScriptException;
use crate::value::ScriptValue;

/// How a source chunk should be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Classic script evaluated in global scope.
    Global,
    /// Module source with its own scope and import semantics.
    Module,
}

/// Status code reported by the buffer-based eval entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EvalStatus {
    /// Evaluation completed and the buffer holds the result string.
    Ok = 0,
    /// No evaluator is installed on the context.
    InvalidContext = -1,
    /// The script threw; the buffer holds the formatted diagnostic.
    Exception = -5,
}

/// Failure modes of [`crate::Context::eval`].
#[derive(Debug, Error)]
pub enum EvalError {
    /// The context was built without an evaluator.
    #[error("no evaluator installed")]
    NoEvaluator,
    /// The evaluated source threw.
    #[error("{0}")]
    Exception(ScriptException),
}

/// A script engine front end.
pub trait Evaluator {
    /// Evaluate `source` with `global` as the visible global object.
    /// `filename` labels diagnostics.
    fn evaluate(
        &mut self,
        global: &ScriptValue,
        source: &str,
        filename: &str,
        mode: EvalMode,
    ) -> Result<ScriptValue, ScriptException>;
}
