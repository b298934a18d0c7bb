//! Host-side hook configuration.
//!
//! Everything the script side needs from its embedder is supplied here at
//! context construction time. A context built without a given hook still
//! works; the corresponding operations fail (or no-op) lazily when first
//! exercised, so embedders wire up only what they use.

use std::rc::Rc;

use tether_interop::{InteropValue, InvokeRequest, InvokeResult, OwnedInteropValue};

/// Handler for named-member invocations on host objects.
pub type InvokeFn = dyn Fn(&InvokeRequest<'_>) -> InvokeResult;
/// Handler for the fixed-arity zero-allocation call path. Receives the
/// method id and the converted argument records.
pub type ZeroAllocFn = dyn Fn(i32, &[InteropValue<'_>]) -> OwnedInteropValue;
/// Sink for console output, called once per logged value.
pub type LogFn = dyn Fn(&str);
/// Notification that the script side no longer references a host handle.
pub type ReleaseHandleFn = dyn Fn(i32);

/// The set of host capabilities a context is constructed with.
#[derive(Clone, Default)]
pub struct HostHooks {
    pub(crate) invoke: Option<Rc<InvokeFn>>,
    pub(crate) log: Option<Rc<LogFn>>,
    pub(crate) release_handle: Option<Rc<ReleaseHandleFn>>,
    pub(crate) zero_alloc: Option<Rc<ZeroAllocFn>>,
}

impl HostHooks {
    /// Start an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the named-member invoke handler.
    pub fn on_invoke(mut self, f: impl Fn(&InvokeRequest<'_>) -> InvokeResult + 'static) -> Self {
        self.invoke = Some(Rc::new(f));
        self
    }

    /// Install the console output sink.
    pub fn on_log(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.log = Some(Rc::new(f));
        self
    }

    /// Install the handle release notification.
    pub fn on_release_handle(mut self, f: impl Fn(i32) + 'static) -> Self {
        self.release_handle = Some(Rc::new(f));
        self
    }

    /// Install the zero-allocation call handler.
    pub fn on_zero_alloc(
        mut self,
        f: impl Fn(i32, &[InteropValue<'_>]) -> OwnedInteropValue + 'static,
    ) -> Self {
        self.zero_alloc = Some(Rc::new(f));
        self
    }
}

impl std::fmt::Debug for HostHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHooks")
            .field("invoke", &self.invoke.is_some())
            .field("log", &self.log.is_some())
            .field("release_handle", &self.release_handle.is_some())
            .field("zero_alloc", &self.zero_alloc.is_some())
            .finish()
    }
}
