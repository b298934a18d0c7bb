//! End-to-end exercises of the bridge: registration round trips, the
//! invoke protocol, the zero-allocation path, evaluation, and teardown.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tether_bridge::{
    BridgeError, CallKind, Context, EvalMode, EvalStatus, Evaluator, HostHooks, InteropValue,
    InvokeResult, ScriptException, ScriptFunction, ScriptValue,
};

fn get_fn(ctx: &Context, name: &str) -> ScriptFunction {
    ctx.global()
        .get(name)
        .unwrap_or_else(|| panic!("missing global {name}"))
        .as_function()
        .unwrap()
        .clone()
}

#[test]
fn callback_round_trip_through_the_table() {
    let ctx = Context::new(HostHooks::new());

    // Script side: register a function that doubles its first argument.
    let raw = get_fn(&ctx, "__registerCallback")
        .call(&[ScriptValue::function(|args| {
            let n = args.first().and_then(ScriptValue::as_f64).unwrap_or(0.0);
            Ok(ScriptValue::Number(n * 2.0))
        })])
        .unwrap()
        .as_i32()
        .unwrap();
    assert!(raw >= 0);
    assert_eq!(ctx.live_callbacks(), 1);

    // Host side: invoke it by handle with record arguments.
    let out = ctx.invoke_callback(raw, &[InteropValue::Int32(21)]).unwrap();
    assert_eq!(out, InteropValue::Int32(42));

    // Unregister, then the handle is dead.
    let released = get_fn(&ctx, "__unregisterCallback")
        .call(&[ScriptValue::Number(raw as f64)])
        .unwrap();
    assert_eq!(released, ScriptValue::Bool(true));
    assert_eq!(ctx.live_callbacks(), 0);
    assert!(ctx.invoke_callback(raw, &[]).is_err());
}

#[test]
fn throwing_callback_is_logged_and_reported() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = lines.clone();
    let ctx = Context::new(
        HostHooks::new().on_log(move |line| sink.borrow_mut().push(line.to_string())),
    );

    let raw = get_fn(&ctx, "__registerCallback")
        .call(&[ScriptValue::function(|_| {
            Err(ScriptException::new("save file corrupted"))
        })])
        .unwrap()
        .as_i32()
        .unwrap();

    match ctx.invoke_callback(raw, &[]) {
        Err(BridgeError::Exception { message }) => assert_eq!(message, "save file corrupted"),
        other => panic!("expected Exception, got {other:?}"),
    }
    assert_eq!(lines.borrow().as_slice(), ["save file corrupted"]);
}

#[test]
fn invoke_callback_rejects_fabricated_handles() {
    let ctx = Context::new(HostHooks::new());
    assert!(matches!(
        ctx.invoke_callback(-1, &[]),
        Err(BridgeError::InvalidHandle(-1))
    ));
    assert!(matches!(
        ctx.invoke_callback(12345, &[]),
        Err(BridgeError::InvalidHandle(12345))
    ));
}

#[test]
fn stale_handle_after_slot_reuse_is_rejected() {
    let ctx = Context::new(HostHooks::new());
    let register = get_fn(&ctx, "__registerCallback");
    let unregister = get_fn(&ctx, "__unregisterCallback");

    let first = register
        .call(&[ScriptValue::function(|_| Ok(ScriptValue::Number(1.0)))])
        .unwrap()
        .as_i32()
        .unwrap();
    unregister.call(&[ScriptValue::Number(first as f64)]).unwrap();
    let second = register
        .call(&[ScriptValue::function(|_| Ok(ScriptValue::Number(2.0)))])
        .unwrap()
        .as_i32()
        .unwrap();
    assert_ne!(first, second);

    assert!(ctx.invoke_callback(first, &[]).is_err());
    assert_eq!(
        ctx.invoke_callback(second, &[]).unwrap(),
        InteropValue::Int32(2)
    );
}

#[test]
fn invoke_protocol_reaches_a_scripted_host_object_model() {
    // A tiny host object model: handle 1 is a player with a health member.
    let health = Rc::new(RefCell::new(100.0_f64));
    let model = health.clone();
    let ctx = Context::new(HostHooks::new().on_invoke(move |req| {
        assert_eq!(req.type_name, "Game.Player");
        match (&*req.member_name, req.call_kind) {
            ("health", CallKind::GetProp) => {
                InvokeResult::ok(InteropValue::Double(*model.borrow()))
            }
            ("health", CallKind::SetProp) => {
                if let Some(InteropValue::Int32(n)) = req.args.first() {
                    *model.borrow_mut() = *n as f64;
                }
                InvokeResult::ok(InteropValue::Null)
            }
            _ => InvokeResult::error(-1, format!("no member {}", req.member_name)),
        }
    }));

    let invoke = get_fn(&ctx, "__cs_invoke");
    let getter = |invoke: &ScriptFunction| {
        invoke
            .call(&[
                ScriptValue::string("Game.Player"),
                ScriptValue::string("health"),
                ScriptValue::Number(CallKind::GetProp.as_i32() as f64),
                ScriptValue::Number(0.0),
                ScriptValue::Number(1.0),
            ])
            .unwrap()
    };
    assert_eq!(getter(&invoke), ScriptValue::Number(100.0));

    invoke
        .call(&[
            ScriptValue::string("Game.Player"),
            ScriptValue::string("health"),
            ScriptValue::Number(CallKind::SetProp.as_i32() as f64),
            ScriptValue::Number(0.0),
            ScriptValue::Number(1.0),
            ScriptValue::array([ScriptValue::Number(65.0)]),
        ])
        .unwrap();
    assert_eq!(getter(&invoke), ScriptValue::Number(65.0));

    let err = invoke
        .call(&[
            ScriptValue::string("Game.Player"),
            ScriptValue::string("mana"),
            ScriptValue::Number(CallKind::GetProp.as_i32() as f64),
            ScriptValue::Number(0.0),
            ScriptValue::Number(1.0),
        ])
        .unwrap_err();
    assert_eq!(err.report(), "no member mana");
}

#[test]
fn zero_alloc_path_borrows_strings_and_skips_json() {
    let calls = Rc::new(RefCell::new(0));
    let seen = calls.clone();
    let ctx = Context::new(HostHooks::new().on_zero_alloc(move |method_id, args| {
        *seen.borrow_mut() += 1;
        assert_eq!(method_id, 11);
        assert!(matches!(
            &args[0],
            InteropValue::String(Cow::Borrowed("jump"))
        ));
        assert_eq!(args[1], InteropValue::Bool(true));
        // Plain objects have no JSON fallback here.
        assert_eq!(args[2], InteropValue::Null);
        InteropValue::vector3(0.0, 4.5, 0.0)
    }));

    let out = get_fn(&ctx, "__zaInvoke3")
        .call(&[
            ScriptValue::Number(11.0),
            ScriptValue::string("jump"),
            ScriptValue::Bool(true),
            ScriptValue::object([("unused", ScriptValue::Number(1.0))]),
        ])
        .unwrap();
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(out.get("y"), Some(ScriptValue::Number(4.5)));
}

struct MapEvaluator {
    results: HashMap<String, Result<ScriptValue, String>>,
}

impl Evaluator for MapEvaluator {
    fn evaluate(
        &mut self,
        global: &ScriptValue,
        source: &str,
        _filename: &str,
        _mode: EvalMode,
    ) -> Result<ScriptValue, ScriptException> {
        assert!(global.get("__cs_invoke").is_some());
        match self.results.get(source) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ScriptException::with_stack(
                message.clone(),
                "    at boot.js:1",
            )),
            None => Err(ScriptException::new(format!("cannot evaluate {source}"))),
        }
    }
}

#[test]
fn eval_routes_through_the_installed_evaluator() {
    let mut ctx = Context::new(HostHooks::new());
    assert!(ctx.eval("1 + 1", "boot.js", EvalMode::Global).is_err());

    let mut results = HashMap::new();
    results.insert("1 + 1".to_string(), Ok(ScriptValue::Number(2.0)));
    results.insert("boom()".to_string(), Err("boom is not defined".to_string()));
    ctx.set_evaluator(Box::new(MapEvaluator { results }));

    let out = ctx.eval("1 + 1", "boot.js", EvalMode::Global).unwrap();
    assert_eq!(out, ScriptValue::Number(2.0));
}

#[test]
fn eval_into_writes_results_and_diagnostics() {
    let mut ctx = Context::new(HostHooks::new());
    let mut buf = [0u8; 64];

    assert_eq!(
        ctx.eval_into("1 + 1", "boot.js", EvalMode::Global, &mut buf),
        EvalStatus::InvalidContext
    );

    let mut results = HashMap::new();
    results.insert("1 + 1".to_string(), Ok(ScriptValue::Number(2.0)));
    results.insert("boom()".to_string(), Err("boom is not defined".to_string()));
    ctx.set_evaluator(Box::new(MapEvaluator { results }));

    assert_eq!(
        ctx.eval_into("1 + 1", "boot.js", EvalMode::Global, &mut buf),
        EvalStatus::Ok
    );
    assert_eq!(cstr(&buf), "2");

    assert_eq!(
        ctx.eval_into("boom()", "boot.js", EvalMode::Global, &mut buf),
        EvalStatus::Exception
    );
    assert_eq!(cstr(&buf), "boom is not defined\n    at boot.js:1");

    // A buffer too small for message plus stack still gets the message.
    let mut tiny = [0u8; 20];
    assert_eq!(
        ctx.eval_into("boom()", "boot.js", EvalMode::Global, &mut tiny),
        EvalStatus::Exception
    );
    assert_eq!(cstr(&tiny), "boom is not defined");
}

fn cstr(buf: &[u8]) -> &str {
    let end = buf.iter().position(|&b| b == 0).unwrap();
    std::str::from_utf8(&buf[..end]).unwrap()
}

#[test]
fn jobs_run_in_order_and_stop_at_the_first_failure() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = lines.clone();
    let ctx = Context::new(
        HostHooks::new().on_log(move |line| sink.borrow_mut().push(line.to_string())),
    );
    let trace = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second"] {
        let trace = trace.clone();
        ctx.enqueue_job(
            ScriptFunction::new(move |_| {
                trace.borrow_mut().push(label);
                Ok(ScriptValue::Undefined)
            }),
            Vec::new(),
        );
    }
    ctx.enqueue_job(
        ScriptFunction::new(|_| Err(ScriptException::new("job failed"))),
        Vec::new(),
    );
    {
        let trace = trace.clone();
        ctx.enqueue_job(
            ScriptFunction::new(move |_| {
                trace.borrow_mut().push("after failure");
                Ok(ScriptValue::Undefined)
            }),
            Vec::new(),
        );
    }

    assert_eq!(ctx.pending_jobs(), 4);
    assert!(ctx.run_pending_jobs().is_err());
    assert_eq!(trace.borrow().as_slice(), ["first", "second"]);
    assert_eq!(lines.borrow().as_slice(), ["job failed"]);

    // The failing job is consumed; the rest still run.
    assert_eq!(ctx.pending_jobs(), 1);
    assert_eq!(ctx.run_pending_jobs().unwrap(), 1);
    assert_eq!(trace.borrow().as_slice(), ["first", "second", "after failure"]);
}

#[test]
fn table_capacity_is_enforced_end_to_end() {
    let ctx = Context::with_registry(
        HostHooks::new(),
        Box::new(tether_bridge::SlotTable::with_capacity(2)),
    );
    let register = get_fn(&ctx, "__registerCallback");
    for _ in 0..2 {
        register
            .call(&[ScriptValue::function(|_| Ok(ScriptValue::Undefined))])
            .unwrap();
    }
    let err = register
        .call(&[ScriptValue::function(|_| Ok(ScriptValue::Undefined))])
        .unwrap_err();
    assert!(err.report().contains("full"));
    assert_eq!(ctx.callback_capacity(), 2);
}
