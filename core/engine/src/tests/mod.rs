//! Engine integration tests.

mod builtins;
mod control_flow;
mod functions;
mod host;
mod objects;
mod operators;

use crate::{Context, JsNativeErrorKind, JsValue};

/// One step of an engine test.
#[derive(Clone)]
pub(crate) enum TestAction {
    /// Runs source, requiring success.
    Run(&'static str),
    /// Runs source and compares the completion value strictly.
    AssertEq(&'static str, JsValue),
    /// Runs source and requires a truthy completion value.
    Assert(&'static str),
    /// Runs source and requires a native error of the given kind whose
    /// message equals the expected text.
    AssertNativeError(&'static str, JsNativeErrorKind, &'static str),
    /// Runs source and requires an opaque (non-`Error`) thrown value equal
    /// to the expected one.
    AssertOpaqueError(&'static str, JsValue),
    /// Runs a closure against the context.
    Inspect(fn(&mut Context)),
}

impl TestAction {
    pub(crate) fn run(source: &'static str) -> Self {
        Self::Run(source)
    }

    pub(crate) fn assert(source: &'static str) -> Self {
        Self::Assert(source)
    }

    pub(crate) fn assert_eq<V: Into<JsValue>>(source: &'static str, expected: V) -> Self {
        Self::AssertEq(source, expected.into())
    }

    pub(crate) fn assert_native_error(
        source: &'static str,
        kind: JsNativeErrorKind,
        message: &'static str,
    ) -> Self {
        Self::AssertNativeError(source, kind, message)
    }
}

/// Runs a sequence of test actions against one fresh context.
#[track_caller]
pub(crate) fn run_test_actions(actions: impl IntoIterator<Item = TestAction>) {
    let context = &mut Context::new();
    run_test_actions_with(actions, context);
}

/// Runs a sequence of test actions against the given context.
#[track_caller]
pub(crate) fn run_test_actions_with(
    actions: impl IntoIterator<Item = TestAction>,
    context: &mut Context,
) {
    for action in actions {
        match action {
            TestAction::Run(source) => {
                if let Err(error) = context.eval(source) {
                    panic!("{source:?} threw {error}");
                }
            }
            TestAction::AssertEq(source, expected) => {
                let value = context
                    .eval(source)
                    .unwrap_or_else(|error| panic!("{source:?} threw {error}"));
                assert!(
                    value.strict_equals(&expected),
                    "{source:?} returned {}, expected {}",
                    value.display(),
                    expected.display(),
                );
            }
            TestAction::Assert(source) => {
                let value = context
                    .eval(source)
                    .unwrap_or_else(|error| panic!("{source:?} threw {error}"));
                assert!(
                    value.to_boolean(),
                    "{source:?} returned falsy {}",
                    value.display(),
                );
            }
            TestAction::AssertNativeError(source, kind, message) => {
                let error = context
                    .eval(source)
                    .err()
                    .unwrap_or_else(|| panic!("{source:?} did not throw"));
                let native = error
                    .as_native()
                    .unwrap_or_else(|| panic!("{source:?} threw a non-native error: {error}"));
                assert_eq!(native.kind, kind, "{source:?} threw the wrong kind");
                assert_eq!(
                    native.message(),
                    message,
                    "{source:?} threw the wrong message",
                );
            }
            TestAction::AssertOpaqueError(source, expected) => {
                let error = context
                    .eval(source)
                    .err()
                    .unwrap_or_else(|| panic!("{source:?} did not throw"));
                let value = error.to_value(context);
                assert!(
                    value.strict_equals(&expected),
                    "{source:?} threw {}, expected {}",
                    value.display(),
                    expected.display(),
                );
            }
            TestAction::Inspect(inspect) => inspect(context),
        }
    }
}

#[test]
fn arithmetic_completion_value() {
    run_test_actions([TestAction::assert_eq("21 * 2", 42)]);
}

#[test]
fn var_hoisting() {
    run_test_actions([
        TestAction::assert_eq("x = 5; var x; x", 5),
        TestAction::assert_eq("a = 7; var a = 10; a", 10),
    ]);
}

#[test]
fn undeclared_identifier_throws() {
    run_test_actions([TestAction::assert_native_error(
        "missing;",
        JsNativeErrorKind::Reference,
        "\"missing\" is not defined",
    )]);
}

#[test]
fn typeof_undeclared_does_not_throw() {
    run_test_actions([TestAction::assert_eq("typeof missing", "undefined")]);
}

#[test]
fn string_length_is_code_points() {
    run_test_actions([
        TestAction::assert_eq("'hello'.length", 5),
        TestAction::assert_eq("'αβγ'.length", 3),
    ]);
}

#[test]
fn global_this_is_global_object() {
    run_test_actions([
        TestAction::assert("this === globalThis"),
        TestAction::assert_eq("var top = 9; this.top", 9),
    ]);
}

#[test]
fn restricted_globals_are_read_only() {
    run_test_actions([
        TestAction::assert_native_error(
            "undefined = 1;",
            JsNativeErrorKind::Type,
            "Cannot assign to read-only property \"undefined\" of object",
        ),
        TestAction::assert("NaN !== NaN"),
        TestAction::assert_eq("Infinity", f64::INFINITY),
    ]);
}

#[test]
fn completion_value_tracks_last_expression() {
    run_test_actions([
        TestAction::run("var noise = 'ignored';"),
        TestAction::assert_eq("1; 2; 3", 3),
        TestAction::Inspect(|context| {
            let retval = context.retval();
            assert!(retval.strict_equals(&JsValue::from(3)));
        }),
    ]);
}
