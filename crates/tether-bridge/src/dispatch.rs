//! The named-member invoke intrinsic.
//!
//! Script code reaches host objects through a single variadic entry point
//! that packages a type name, member name, call kind, static flag, target
//! handle and argument list into an [`InvokeRequest`] and hands it to the
//! host's invoke hook.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use tether_interop::{CallKind, InvokeRequest};

use crate::context::ContextState;
use crate::convert;
use crate::exception::ScriptException;
use crate::value::{ScriptFunction, ScriptValue};

pub(crate) fn make_cs_invoke(state: Rc<RefCell<ContextState>>) -> ScriptFunction {
    ScriptFunction::new(move |args| {
        // Clone the hook out of the borrow; the host handler may call
        // back into this context.
        let hook = state.borrow().hooks.invoke.clone();
        let hook = hook
            .ok_or_else(|| ScriptException::new("host invoke hook is not installed"))?;

        if args.len() < 5 {
            return Err(ScriptException::type_error(
                "invoke expects (typeName, memberName, callKind, isStatic, targetHandle, args?)",
            ));
        }

        let type_name = args[0]
            .as_str()
            .ok_or_else(|| ScriptException::type_error("typeName must be a string"))?;
        let member_name = args[1]
            .as_str()
            .ok_or_else(|| ScriptException::type_error("memberName must be a string"))?;
        let call_kind = args[2]
            .as_i32()
            .and_then(CallKind::from_i32)
            .ok_or_else(|| ScriptException::type_error("unknown call kind"))?;
        let is_static = args[3].as_i32().unwrap_or(0) != 0;
        let target_handle = args[4].as_i32().unwrap_or(0);

        let converted = match args.get(5) {
            None => Vec::new(),
            Some(list) if list.is_nullish() => Vec::new(),
            Some(ScriptValue::Array(items)) => {
                items.borrow().iter().map(convert::from_script).collect()
            }
            Some(_) => {
                return Err(ScriptException::type_error("invoke args must be an array"));
            }
        };

        let request = InvokeRequest {
            type_name: Cow::Borrowed(type_name),
            member_name: Cow::Borrowed(member_name),
            call_kind,
            is_static,
            target_handle,
            args: converted,
        };

        let result = hook(&request);
        if result.error_code != 0 {
            let message = result
                .error_message
                .unwrap_or_else(|| "host invoke error".to_string());
            return Err(ScriptException::new(message));
        }
        Ok(convert::to_script(&result.return_value))
    })
}
