//! Bridge context: the global object, its intrinsics, the callback
//! registry, the job queue and the evaluation entry points.
//!
//! A [`Context`] is self-contained. Two contexts share nothing, so an
//! embedder can run isolated script worlds side by side, each with its
//! own host hooks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tether_interop::{BridgeError, CallbackHandle, InteropValue, OwnedInteropValue};

use crate::callbacks::{CallbackRegistry, SlotTable};
use crate::convert;
use crate::dispatch;
use crate::engine::{EvalError, EvalMode, EvalStatus, Evaluator};
use crate::exception::{self, ScriptException};
use crate::host::HostHooks;
use crate::value::{ScriptFunction, ScriptValue};
use crate::zeroalloc;

/// A script function plus arguments queued for deferred execution.
struct PendingJob {
    func: ScriptFunction,
    args: Vec<ScriptValue>,
}

pub(crate) struct ContextState {
    pub(crate) callbacks: Box<dyn CallbackRegistry>,
    pub(crate) hooks: HostHooks,
    jobs: VecDeque<PendingJob>,
    torn_down: bool,
}

/// An isolated script world wired to one set of host hooks.
pub struct Context {
    state: Rc<RefCell<ContextState>>,
    global: ScriptValue,
    evaluator: Option<Box<dyn Evaluator>>,
}

impl Context {
    /// Create a context with the default bounded callback table.
    pub fn new(hooks: HostHooks) -> Self {
        Self::with_registry(hooks, Box::new(SlotTable::new()))
    }

    /// Create a context over a caller-supplied callback registry.
    pub fn with_registry(hooks: HostHooks, callbacks: Box<dyn CallbackRegistry>) -> Self {
        let state = Rc::new(RefCell::new(ContextState {
            callbacks,
            hooks,
            jobs: VecDeque::new(),
            torn_down: false,
        }));
        let global = ScriptValue::object::<&str>([]);
        install_intrinsics(&global, &state);
        Self {
            state,
            global,
            evaluator: None,
        }
    }

    /// The global object every evaluation sees.
    pub fn global(&self) -> &ScriptValue {
        &self.global
    }

    /// Plug in the script engine front end.
    pub fn set_evaluator(&mut self, evaluator: Box<dyn Evaluator>) {
        self.evaluator = Some(evaluator);
    }

    /// Evaluate `source` against this context's global object.
    pub fn eval(
        &mut self,
        source: &str,
        filename: &str,
        mode: EvalMode,
    ) -> Result<ScriptValue, EvalError> {
        let evaluator = self.evaluator.as_mut().ok_or(EvalError::NoEvaluator)?;
        evaluator
            .evaluate(&self.global, source, filename, mode)
            .map_err(EvalError::Exception)
    }

    /// Buffer-based evaluation entry point. Writes the result's display
    /// string (or the formatted diagnostic) into `out` as a
    /// NUL-terminated string and reports a status code.
    pub fn eval_into(
        &mut self,
        source: &str,
        filename: &str,
        mode: EvalMode,
        out: &mut [u8],
    ) -> EvalStatus {
        match self.eval(source, filename, mode) {
            Ok(value) => {
                exception::write_cstr(out, &value.to_display_string());
                EvalStatus::Ok
            }
            Err(EvalError::NoEvaluator) => {
                exception::write_cstr(out, "no evaluator installed");
                EvalStatus::InvalidContext
            }
            Err(EvalError::Exception(exc)) => {
                exception::format_exception_into(&exc, out);
                EvalStatus::Exception
            }
        }
    }

    /// Call a registered script callback from the host side.
    ///
    /// Arguments cross in record form and are rebuilt as script values.
    /// A throwing callback is reported to the log hook and surfaces as
    /// [`BridgeError::Exception`].
    pub fn invoke_callback(
        &self,
        raw: i32,
        args: &[InteropValue<'_>],
    ) -> Result<OwnedInteropValue, BridgeError> {
        let handle = CallbackHandle::from_raw(raw).ok_or(BridgeError::InvalidHandle(raw))?;
        let (func, log) = {
            let state = self.state.borrow();
            if state.torn_down {
                return Err(BridgeError::InvalidContext);
            }
            (state.callbacks.lookup(handle)?, state.hooks.log.clone())
        };
        let script_args: Vec<ScriptValue> = args.iter().map(convert::to_script).collect();
        match func.call(&script_args) {
            Ok(value) => Ok(convert::from_script(&value)),
            Err(exc) => {
                let report = exc.report();
                if let Some(log) = log {
                    log(&report);
                }
                Err(BridgeError::Exception { message: report })
            }
        }
    }

    /// Queue a script function for a later [`run_pending_jobs`] pass.
    ///
    /// [`run_pending_jobs`]: Context::run_pending_jobs
    pub fn enqueue_job(&self, func: ScriptFunction, args: Vec<ScriptValue>) {
        self.state
            .borrow_mut()
            .jobs
            .push_back(PendingJob { func, args });
    }

    /// Number of jobs waiting in the queue.
    pub fn pending_jobs(&self) -> usize {
        self.state.borrow().jobs.len()
    }

    /// Drain the job queue in order. Stops at the first throwing job;
    /// its exception is logged and returned, and later jobs stay queued.
    pub fn run_pending_jobs(&self) -> Result<usize, BridgeError> {
        let mut ran = 0;
        loop {
            // Jobs may enqueue further jobs, so pop one at a time.
            let (job, log) = {
                let mut state = self.state.borrow_mut();
                match state.jobs.pop_front() {
                    Some(job) => (job, state.hooks.log.clone()),
                    None => return Ok(ran),
                }
            };
            match job.func.call(&job.args) {
                Ok(_) => ran += 1,
                Err(exc) => {
                    let report = exc.report();
                    if let Some(log) = log {
                        log(&report);
                    }
                    return Err(BridgeError::Exception { message: report });
                }
            }
        }
    }

    /// Occupied slots in the callback table.
    pub fn live_callbacks(&self) -> usize {
        self.state.borrow().callbacks.live_count()
    }

    /// Slot capacity of the callback table.
    pub fn callback_capacity(&self) -> usize {
        self.state.borrow().callbacks.capacity()
    }

    /// Release every pinned callback and pending job. Idempotent;
    /// outstanding handles become stale and host-side calls fail with
    /// [`BridgeError::InvalidContext`].
    pub fn teardown(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.torn_down {
            return;
        }
        state.callbacks.teardown();
        state.jobs.clear();
        state.torn_down = true;
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn install_intrinsics(global: &ScriptValue, state: &Rc<RefCell<ContextState>>) {
    let console = ScriptValue::object::<&str>([]);
    let log = make_console_log(state.clone());
    for level in ["log", "info", "warn", "error"] {
        console.set(level, ScriptValue::Function(log.clone()));
    }
    global.set("console", console);

    global.set(
        "__registerCallback",
        ScriptValue::Function(make_register(state.clone())),
    );
    global.set(
        "__unregisterCallback",
        ScriptValue::Function(make_unregister(state.clone())),
    );
    global.set(
        "__releaseHandle",
        ScriptValue::Function(make_release_handle(state.clone())),
    );
    global.set(
        "__cs_invoke",
        ScriptValue::Function(dispatch::make_cs_invoke(state.clone())),
    );

    global.set(
        "__zaInvoke0",
        ScriptValue::Function(zeroalloc::make_za_invoke::<0>(state.clone())),
    );
    global.set(
        "__zaInvoke1",
        ScriptValue::Function(zeroalloc::make_za_invoke::<1>(state.clone())),
    );
    global.set(
        "__zaInvoke2",
        ScriptValue::Function(zeroalloc::make_za_invoke::<2>(state.clone())),
    );
    global.set(
        "__zaInvoke3",
        ScriptValue::Function(zeroalloc::make_za_invoke::<3>(state.clone())),
    );
    global.set(
        "__zaInvoke4",
        ScriptValue::Function(zeroalloc::make_za_invoke::<4>(state.clone())),
    );
    global.set(
        "__zaInvoke5",
        ScriptValue::Function(zeroalloc::make_za_invoke::<5>(state.clone())),
    );
    global.set(
        "__zaInvoke6",
        ScriptValue::Function(zeroalloc::make_za_invoke::<6>(state.clone())),
    );
    global.set(
        "__zaInvoke7",
        ScriptValue::Function(zeroalloc::make_za_invoke::<7>(state.clone())),
    );
    global.set(
        "__zaInvoke8",
        ScriptValue::Function(zeroalloc::make_za_invoke::<8>(state.clone())),
    );
}

fn make_console_log(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        let log = state.borrow().hooks.log.clone();
        if let Some(log) = log {
            // One sink call per logged value.
            for arg in args {
                log(&arg.to_display_string());
            }
        }
        Ok(ScriptValue::Undefined)
    })
}

fn make_register(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        let func = args
            .first()
            .and_then(ScriptValue::as_function)
            .ok_or_else(|| ScriptException::type_error("callback must be a function"))?;
        let handle = state
            .borrow_mut()
            .callbacks
            .register(func.clone())
            .map_err(|err| ScriptException::new(err.to_string()))?;
        Ok(ScriptValue::Number(handle.to_raw() as f64))
    })
}

fn make_unregister(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        // Malformed or stale handles are a soft failure, not a throw.
        let released = args
            .first()
            .and_then(ScriptValue::as_i32)
            .and_then(CallbackHandle::from_raw)
            .map(|handle| state.borrow_mut().callbacks.unregister(handle))
            .unwrap_or(false);
        Ok(ScriptValue::Bool(released))
    })
}

fn make_release_handle(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        let handle = args.first().and_then(ScriptValue::as_i32).unwrap_or(0);
        // Handles at or below zero never name a live host object.
        if handle > 0 {
            let hook = state.borrow().hooks.release_handle.clone();
            if let Some(hook) = hook {
                hook(handle);
            }
        }
        Ok(ScriptValue::Undefined)
    })
}
