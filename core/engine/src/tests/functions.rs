//! Functions: closures, arrows, `this` binding, `arguments`, bind.

use super::{run_test_actions, TestAction};
use crate::{JsNativeErrorKind, JsValue};
use indoc::indoc;

#[test]
fn closures_capture_by_reference() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function counter() {
                var count = 0;
                return function() { count += 1; return count; };
            }
            var next = counter();
            next(); next();
            next()
        "#},
        3,
    )]);
}

#[test]
fn closures_survive_the_outer_call() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function make(start) {
                var value = start;
                return {
                    get: function() { return value; },
                    set: function(v) { value = v; }
                };
            }
            var box = make(1);
            box.set(41);
            box.get() + make(100).get()
        "#},
        141,
    )]);
}

#[test]
fn nested_closures_reach_outer_scopes() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function outer() {
                var a = 1;
                function middle() {
                    var b = 2;
                    function inner() { return a + b; }
                    return inner;
                }
                return middle();
            }
            outer()()
        "#},
        3,
    )]);
}

#[test]
fn named_function_expression_sees_itself() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1); };
            fact(5)
        "#},
        120,
    )]);
}

#[test]
fn rest_parameters_collect_the_tail() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function f(first, ...rest) { return first + ':' + rest.join(','); }
            f(1, 2, 3, 4)
        "#},
        "1:2,3,4",
    )]);
}

#[test]
fn spread_arguments_expand() {
    run_test_actions([
        TestAction::assert_eq(
            "function add3(a, b, c) { return a + b + c; } add3(...[1, 2, 3])",
            6,
        ),
        TestAction::assert_eq(
            "function f(a, b, c) { return '' + a + b + c; } f(0, ...[1, 2])",
            "012",
        ),
    ]);
}

#[test]
fn arguments_object() {
    run_test_actions([
        TestAction::assert_eq(
            "function f() { return arguments.length; } f(1, 'x', null)",
            3,
        ),
        TestAction::assert_eq("function f() { return arguments[1]; } f(1, 'x')", "x"),
        TestAction::assert_native_error(
            "function f() { return arguments.callee; } f();",
            JsNativeErrorKind::Type,
            "\"callee\" property of the arguments object may not be accessed",
        ),
        TestAction::assert_native_error(
            "function f() { return arguments.caller; } f();",
            JsNativeErrorKind::Type,
            "\"caller\" property of the arguments object may not be accessed",
        ),
    ]);
}

#[test]
fn plain_calls_get_undefined_this() {
    run_test_actions([TestAction::assert(
        "function f() { return this === undefined; } f()",
    )]);
}

#[test]
fn method_calls_bind_the_receiver() {
    run_test_actions([TestAction::assert_eq(
        "var o = {n: 7, get_n: function() { return this.n; }}; o.get_n()",
        7,
    )]);
}

#[test]
fn arrows_capture_this_lexically() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var o = {
                value: 11,
                collect: function() {
                    var grab = () => this.value;
                    return grab();
                }
            };
            o.collect()
        "#},
        11,
    )]);
}

#[test]
fn arrows_capture_arguments_lexically() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function f() {
                var inner = () => arguments[0];
                return inner('shadowed');
            }
            f('outer')
        "#},
        "outer",
    )]);
}

#[test]
fn arrows_are_not_constructors() {
    run_test_actions([TestAction::assert_native_error(
        "var f = () => 1; new f();",
        JsNativeErrorKind::Type,
        "function is not a constructor",
    )]);
}

#[test]
fn call_and_apply_set_this() {
    run_test_actions([
        TestAction::assert_eq(
            "function f() { return this.tag; } f.call({tag: 'c'})",
            "c",
        ),
        TestAction::assert_eq(
            "function f(a, b) { return this.tag + a + b; } f.apply({tag: 'x'}, [1, 2])",
            "x12",
        ),
    ]);
}

#[test]
fn bound_functions_prepend_arguments() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                function join(a, b, c) { return this.sep + a + b + c; }
                var bound = join.bind({sep: ':'}, 1);
                bound(2, 3)
            "#},
            ":123",
        ),
        TestAction::assert_eq(
            "function f(a, b) {} f.bind(null, 1).length",
            1,
        ),
        TestAction::assert_eq(
            "function g() {} g.bind(null).name",
            "bound g",
        ),
    ]);
}

#[test]
fn calling_a_non_function_names_the_method() {
    run_test_actions([TestAction::assert_native_error(
        "var o = {x: 5}; o.x();",
        JsNativeErrorKind::Type,
        "x is not a function",
    )]);
}

#[test]
fn new_call_binding_order() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                function Maker() { this.value = 1; return function() { return 'called'; }; }
                new Maker()()
            "#},
            "called",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                function Outer() { return function Inner() { this.tag = 'inner'; }; }
                var instance = new new Outer()();
                instance.tag
            "#},
            "inner",
        ),
    ]);
}

#[test]
fn constructor_returns_this_unless_object() {
    run_test_actions([
        TestAction::assert_eq(
            "function C() { this.v = 3; return 42; } new C().v",
            3,
        ),
        TestAction::assert_eq(
            "function C() { return {v: 9}; } new C().v",
            9,
        ),
    ]);
}

#[test]
fn function_properties() {
    run_test_actions([
        TestAction::assert_eq("function two(a, b) {} two.length", 2),
        TestAction::assert_eq("function named() {} named.name", "named"),
        TestAction::assert_eq("(function(a, b, c) {}).length", 3),
        TestAction::assert("function f() {} f.prototype.constructor === f"),
    ]);
}

#[test]
fn function_constructor_is_gated() {
    run_test_actions([TestAction::assert_native_error(
        "new Function('a', 'b', 'return a + b');",
        JsNativeErrorKind::Type,
        "function constructor is disabled in \"safe\" mode",
    )]);

    let context = &mut crate::Context::builder().unsafe_eval(true).build();
    super::run_test_actions_with(
        [TestAction::assert_eq(
            "new Function('a', 'b', 'return a + b')(2, 4)",
            JsValue::from(6),
        )],
        context,
    );
}

#[test]
fn destructuring_declarations_and_assignments() {
    run_test_actions([
        TestAction::assert_eq("var [a, , b] = [1, 2, 3]; a + b", 4),
        TestAction::assert_eq("var [x, ...rest] = [1, 2, 3]; rest.join('')", "23"),
        TestAction::assert_eq("var {m, n: renamed} = {m: 1, n: 2}; m + renamed", 3),
        TestAction::assert_eq("var {p: {q}} = {p: {q: 5}}; q", 5),
        TestAction::assert_eq("var a, b; [a, b] = [7, 8]; a * b", 56),
    ]);
}
