//! The embedding surface: bindings, options, externals and modules.

use super::{run_test_actions_with, TestAction};
use crate::{
    external::ExternalPrototype,
    Context, JsNativeErrorKind, JsValue,
};
use std::rc::Rc;

#[test]
fn bind_installs_globals() {
    let context = &mut Context::new();
    context.bind("answer", JsValue::from(42), false);
    context.bind("fixed", JsValue::from("locked"), true);
    run_test_actions_with(
        [
            TestAction::assert_eq("answer", 42),
            TestAction::assert_eq("answer = 43; answer", 43),
            TestAction::assert_native_error(
                "fixed = 'changed';",
                JsNativeErrorKind::Type,
                "Cannot assign to read-only property \"fixed\" of object",
            ),
        ],
        context,
    );
}

#[test]
fn retval_string_coerces_the_completion_value() {
    let context = &mut Context::new();
    context.eval("({toString: function() { return 'coerced'; }})").unwrap();
    assert_eq!(
        context.retval_string().unwrap().to_std_string_lossy(),
        "coerced",
    );
}

#[test]
fn compile_once_run_many() {
    let context = &mut Context::new();
    context.eval("var hits = 0;").unwrap();
    let code = context.compile("hits += 1; hits").unwrap();
    for expected in 1..=3 {
        let result = context.execute(Rc::clone(&code)).unwrap();
        assert!(result.strict_equals(&JsValue::from(expected)));
    }
}

#[test]
fn contexts_are_independent_clones() {
    let first = &mut Context::new();
    let second = &mut Context::new();
    first.eval("Array.prototype.marker = 'polluted';").unwrap();
    run_test_actions_with(
        [TestAction::assert_eq("[].marker === undefined", true)],
        second,
    );
    run_test_actions_with(
        [TestAction::assert_eq("[].marker", "polluted")],
        first,
    );
}

#[test]
fn syntax_errors_carry_the_line() {
    let context = &mut Context::new();
    let error = context.eval("var a = 1;\nvar b = ;").unwrap_err();
    let native = error.as_native().expect("syntax errors are native");
    assert_eq!(native.kind, JsNativeErrorKind::Syntax);
    assert!(
        native.message().contains(":2"),
        "message should name line 2: {}",
        native.message(),
    );
}

#[test]
fn sandbox_hides_the_fs_module() {
    let context = &mut Context::builder().sandbox(true).build();
    run_test_actions_with(
        [
            TestAction::assert_native_error(
                "require('fs');",
                JsNativeErrorKind::Error,
                "Cannot find module \"fs\"",
            ),
            // crypto stays available in sandboxed contexts.
            TestAction::assert_eq("typeof require('crypto').createHash", "function"),
        ],
        context,
    );
}

#[test]
fn module_mode_gates_imports() {
    let script = &mut Context::new();
    assert!(script.eval("import crypto from 'crypto';").is_err());

    let module = &mut Context::builder().module(true).build();
    run_test_actions_with(
        [
            TestAction::assert_eq(
                "import crypto from 'crypto'; typeof crypto.createHmac",
                "function",
            ),
            TestAction::assert_eq("export default 40 + 2;", 42),
        ],
        module,
    );
}

#[test]
fn denormals_flush_when_disabled() {
    let flushing = &mut Context::builder().denormals(false).build();
    run_test_actions_with(
        [TestAction::assert_eq("5e-324", 0.0)],
        flushing,
    );

    let keeping = &mut Context::new();
    run_test_actions_with([TestAction::assert_eq("5e-324 > 0", true)], keeping);
}

#[test]
fn process_argv_comes_from_the_options() {
    let context = &mut Context::builder()
        .argv(vec!["adder".to_owned(), "script.js".to_owned()])
        .build();
    run_test_actions_with(
        [
            TestAction::assert_eq("process.argv.length", 2),
            TestAction::assert_eq("process.argv[1]", "script.js"),
            TestAction::assert_eq("typeof process.env", "object"),
            TestAction::assert_eq("typeof process.pid", "number"),
        ],
        context,
    );
}

#[test]
fn recursion_limit_is_configurable() {
    let context = &mut Context::builder().recursion_limit(32).build();
    run_test_actions_with(
        [TestAction::assert_native_error(
            "function f(n) { return n === 0 ? 0 : f(n - 1); } f(1000);",
            JsNativeErrorKind::Range,
            "Maximum call stack size exceeded",
        )],
        context,
    );
}

#[test]
fn timer_hook_receives_forwarded_calls() {
    let context = &mut Context::new();
    context.set_timer_hook(Rc::new(|_, args, context| {
        // A host scheduler would queue this; the test runs it inline.
        let callback = args.first().cloned().unwrap_or_default();
        context.call(&callback, &JsValue::Undefined, &[])
    }));
    run_test_actions_with(
        [TestAction::assert_eq(
            "var ran = false; setTimeout(function() { ran = true; }, 0); ran",
            true,
        )],
        context,
    );
}

fn sample_external() -> ExternalPrototype {
    ExternalPrototype::builder()
        .property(
            "uri",
            Some(Rc::new(|external: &crate::external::JsExternal, _: &mut Context| {
                let data = external
                    .data::<std::cell::RefCell<String>>()
                    .expect("payload is a string cell");
                let text = data.borrow().clone();
                Ok(JsValue::from(text))
            })),
            Some(Rc::new(
                |external: &crate::external::JsExternal, value: &JsValue, context: &mut Context| {
                    let data = external
                        .data::<std::cell::RefCell<String>>()
                        .expect("payload is a string cell");
                    *data.borrow_mut() = value.to_string(context)?.to_std_string_lossy();
                    Ok(())
                },
            )),
            None,
        )
        .method(
            "describe",
            Rc::new(|external: &crate::external::JsExternal, args: &[JsValue], context: &mut Context| {
                let data = external
                    .data::<std::cell::RefCell<String>>()
                    .expect("payload is a string cell");
                let suffix = match args.first() {
                    Some(value) => value.to_string(context)?.to_std_string_lossy(),
                    None => String::new(),
                };
                Ok(JsValue::from(format!("{}{suffix}", data.borrow())))
            }),
        )
        .object("nested", |nested| {
            nested.property(
                "tag",
                Some(Rc::new(|_: &crate::external::JsExternal, _: &mut Context| {
                    Ok(JsValue::from("inner"))
                })),
                None,
                None,
            )
        })
        .build()
}

#[test]
fn external_objects_dispatch_to_host_callbacks() {
    let context = &mut Context::new();
    let prototype = sample_external();
    let payload = Rc::new(std::cell::RefCell::new("http://example".to_owned()));
    let external = context.external_create(&prototype, payload);
    context.bind("$r", external, true);

    run_test_actions_with(
        [
            TestAction::assert_eq("$r.uri", "http://example"),
            TestAction::assert_eq("$r.uri = 'changed'; $r.uri", "changed"),
            TestAction::assert_eq("$r.describe('!')", "changed!"),
            TestAction::assert_eq("$r.nested.tag", "inner"),
            // Nested identities are stable across reads.
            TestAction::assert_eq("$r.nested === $r.nested", true),
            TestAction::assert_eq("typeof $r", "external"),
            TestAction::assert_eq(
                "var keys = []; for (var k in $r) { keys.push(k); } keys.join(',')",
                "uri,describe,nested",
            ),
            TestAction::assert_native_error(
                "$r.missing = 1;",
                JsNativeErrorKind::Type,
                "Cannot add property \"missing\" to external value",
            ),
        ],
        context,
    );
}
