//! Control flow: loops, switch, labels, try/catch/finally.

use super::{run_test_actions, TestAction};
use crate::{JsNativeErrorKind, JsValue};
use indoc::indoc;

#[test]
fn while_loop() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var sum = 0;
            var i = 0;
            while (i < 5) { sum += i; i++; }
            sum
        "#},
        10,
    )]);
}

#[test]
fn do_while_runs_at_least_once() {
    run_test_actions([TestAction::assert_eq(
        "var n = 0; do { n++; } while (false); n",
        1,
    )]);
}

#[test]
fn for_loop_with_break_and_continue() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var sum = 0;
            for (var i = 0; i < 10; i++) {
                if (i % 2) { continue; }
                if (i > 6) { break; }
                sum += i;
            }
            sum
        "#},
        12,
    )]);
}

#[test]
fn labelled_loops() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var hits = 0;
            outer: for (var i = 0; i < 3; i++) {
                for (var j = 0; j < 3; j++) {
                    if (j === 1) { continue outer; }
                    if (i === 2) { break outer; }
                    hits++;
                }
            }
            hits
        "#},
        2,
    )]);
}

#[test]
fn labelled_block_break() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var path = '';
            lbl: {
                path += 'a';
                break lbl;
            }
            path += 'b';
            path
        "#},
        "ab",
    )]);
}

#[test]
fn for_in_enumerates_own_then_inherited() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function Base() {}
            Base.prototype.inherited = 1;
            var o = new Base();
            o.b = 2;
            o.a = 3;
            var keys = '';
            for (var k in o) { keys += k + ';'; }
            keys
        "#},
        "b;a;inherited;",
    )]);
}

#[test]
fn for_in_shadowed_names_are_suppressed() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function Base() {}
            Base.prototype.dup = 1;
            var o = new Base();
            o.dup = 2;
            var seen = 0;
            for (var k in o) { seen++; }
            seen
        "#},
        1,
    )]);
}

#[test]
fn for_in_skips_deleted_keys() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var o = {a: 1, b: 2, c: 3};
            var keys = '';
            for (var k in o) {
                if (k === 'a') { delete o.b; }
                keys += k;
            }
            keys
        "#},
        "ac",
    )]);
}

#[test]
fn for_in_over_array_uses_indices() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var a = [10, 20, 30];
            var out = '';
            for (var i in a) { out += i; }
            out
        "#},
        "012",
    )]);
}

#[test]
fn switch_matches_strictly_and_falls_through() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function pick(v) {
                var out = '';
                switch (v) {
                    case '1': out += 'string one;';
                    case 1: out += 'one;'; break;
                    default: out += 'other;';
                }
                return out;
            }
            pick(1) + '|' + pick('1') + '|' + pick(2)
        "#},
        "one;|string one;one;|other;",
    )]);
}

#[test]
fn try_catch_binds_thrown_value() {
    run_test_actions([
        TestAction::assert_eq(
            "var got; try { throw 42; } catch (e) { got = e; } got",
            42,
        ),
        TestAction::assert_eq(
            indoc! {r#"
                var name = '';
                try { null.x; } catch (e) { name = e.name; }
                name
            "#},
            "TypeError",
        ),
    ]);
}

#[test]
fn finally_always_runs() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var log = '';
            try {
                try { throw 'x'; } finally { log += 'inner;'; }
            } catch (e) {
                log += 'caught ' + e + ';';
            } finally {
                log += 'outer;';
            }
            log
        "#},
        "inner;caught x;outer;",
    )]);
}

// A finally that completes with its own return overrides the pending one.
#[test]
fn finally_overrides_pending_return() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function f() {
                try { return 'a'; } finally { return 'b'; }
            }
            f()
        "#},
        "b",
    )]);
}

#[test]
fn finally_runs_before_break_leaves_the_loop() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var log = '';
            for (var i = 0; i < 3; i++) {
                try {
                    if (i === 1) { break; }
                    log += i + ';';
                } finally {
                    log += 'fin' + i + ';';
                }
            }
            log
        "#},
        "0;fin0;fin1;",
    )]);
}

#[test]
fn finally_throw_replaces_pending_completion() {
    run_test_actions([TestAction::AssertOpaqueError(
        "function f() { try { return 1; } finally { throw 'boom'; } } f();",
        JsValue::from("boom"),
    )]);
}

#[test]
fn rethrow_from_catch_reaches_outer_catch() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var out = '';
            try {
                try { throw 'inner'; } catch (e) { throw e + '!'; }
            } catch (e) {
                out = e;
            }
            out
        "#},
        "inner!",
    )]);
}

#[test]
fn conflicting_try_exit_targets_are_rejected() {
    run_test_actions([TestAction::assert_native_error(
        indoc! {r#"
            a: for (var i = 0; i < 3; i++) {
                b: for (var j = 0; j < 3; j++) {
                    try {
                        if (j === 0) { break a; } else { break b; }
                    } finally { }
                }
            }
        "#},
        JsNativeErrorKind::Internal,
        "try/catch/finally with conflicting jump targets at line 4",
    )]);
}

#[test]
fn uncaught_errors_unwind_to_the_host() {
    run_test_actions([TestAction::assert_native_error(
        "function f() { g(); } function g() { h(); } function h() { missing(); } f();",
        JsNativeErrorKind::Reference,
        "\"missing\" is not defined",
    )]);
}

#[test]
fn deep_recursion_is_a_range_error() {
    run_test_actions([TestAction::assert_native_error(
        "function f() { return f(); } f();",
        JsNativeErrorKind::Range,
        "Maximum call stack size exceeded",
    )]);
}
