//! Fixed-arity zero-allocation call path.
//!
//! Hot per-frame host calls bypass the variadic invoke protocol: one
//! intrinsic per arity converts its arguments on the stack with borrowed
//! string payloads and no JSON fallback, then hands the host a method id
//! and the argument records.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::ContextState;
use crate::convert;
use crate::exception::ScriptException;
use crate::value::ScriptFunction;

/// Highest arity the bridge installs an intrinsic for.
pub const MAX_ARITY: usize = 8;

pub(crate) fn make_za_invoke<const N: usize>(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        let hook = state.borrow().hooks.zero_alloc.clone();
        let hook = hook
            .ok_or_else(|| ScriptException::new("zero-alloc invoke hook is not installed"))?;

        // Exact shape: method id plus N arguments. Excess is ignored.
        if args.len() < N + 1 {
            return Err(ScriptException::type_error(format!(
                "zero-alloc invoke expects a method id and {N} arguments"
            )));
        }
        let method_id = args[0]
            .as_i32()
            .ok_or_else(|| ScriptException::type_error("method id must be a number"))?;

        let converted = std::array::from_fn::<_, N, _>(|i| {
            convert::from_script_borrowed(&args[i + 1])
        });
        let result = hook(method_id, &converted);
        Ok(convert::to_script(&result))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::host::HostHooks;
    use crate::value::ScriptValue;
    use std::borrow::Cow;
    use tether_interop::InteropValue;

    fn za(ctx: &Context, name: &str) -> ScriptFunction {
        ctx.global().get(name).unwrap().as_function().unwrap().clone()
    }

    #[test]
    fn arguments_cross_borrowed_without_json_fallback() {
        let ctx = Context::new(HostHooks::new().on_zero_alloc(|method_id, args| {
            assert_eq!(method_id, 3);
            assert_eq!(args.len(), 2);
            assert!(matches!(
                &args[0],
                InteropValue::String(Cow::Borrowed("ammo"))
            ));
            // Plain objects degrade on the hot path.
            assert_eq!(args[1], InteropValue::Null);
            InteropValue::Int32(30)
        }));
        let out = za(&ctx, "__zaInvoke2")
            .call(&[
                ScriptValue::Number(3.0),
                ScriptValue::string("ammo"),
                ScriptValue::object([("hp", ScriptValue::Number(1.0))]),
            ])
            .unwrap();
        assert_eq!(out, ScriptValue::Number(30.0));
    }

    #[test]
    fn nullary_path_passes_only_the_method_id() {
        let ctx = Context::new(HostHooks::new().on_zero_alloc(|method_id, args| {
            assert_eq!(method_id, 9);
            assert!(args.is_empty());
            InteropValue::Null
        }));
        let out = za(&ctx, "__zaInvoke0")
            .call(&[ScriptValue::Number(9.0)])
            .unwrap();
        assert_eq!(out, ScriptValue::Null);
    }

    #[test]
    fn missing_arguments_raise_a_type_error() {
        let ctx = Context::new(HostHooks::new().on_zero_alloc(|_, _| InteropValue::Null));
        let err = za(&ctx, "__zaInvoke2")
            .call(&[ScriptValue::Number(3.0), ScriptValue::Number(1.0)])
            .unwrap_err();
        assert!(err.report().starts_with("TypeError:"));
    }

    #[test]
    fn excess_arguments_are_ignored() {
        let ctx = Context::new(HostHooks::new().on_zero_alloc(|_, args| {
            assert_eq!(args.len(), 1);
            InteropValue::Null
        }));
        za(&ctx, "__zaInvoke1")
            .call(&[
                ScriptValue::Number(1.0),
                ScriptValue::Bool(true),
                ScriptValue::Bool(false),
            ])
            .unwrap();
    }

    #[test]
    fn missing_hook_fails_at_call_time() {
        let ctx = Context::new(HostHooks::new());
        let err = za(&ctx, "__zaInvoke0")
            .call(&[ScriptValue::Number(0.0)])
            .unwrap_err();
        assert!(err.report().contains("not installed"));
    }
}
