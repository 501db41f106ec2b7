//! Operator semantics: coercions, equality, short-circuiting, symbols.

use super::{run_test_actions, TestAction};
use crate::JsNativeErrorKind;
use indoc::indoc;

#[test]
fn addition_prefers_strings() {
    run_test_actions([
        TestAction::assert_eq("1 + 2", 3),
        TestAction::assert_eq("'1' + 2", "12"),
        TestAction::assert_eq("1 + '2'", "12"),
        TestAction::assert_eq("1 + null", 1),
        TestAction::assert_eq("1 + undefined + ''", "NaN"),
        TestAction::assert_eq("[1, 2] + ''", "1,2"),
    ]);
}

#[test]
fn ieee_754_edge_cases() {
    run_test_actions([
        TestAction::assert("0.1 + 0.2 !== 0.3"),
        TestAction::assert_eq("1 / 0", f64::INFINITY),
        TestAction::assert_eq("-1 / 0", f64::NEG_INFINITY),
        TestAction::assert("isNaN(0 / 0)"),
        TestAction::assert("Object.is(-0, -0)"),
        TestAction::assert("!Object.is(-0, 0)"),
        TestAction::assert("Object.is(Math.round(-0.5), -0)"),
        TestAction::assert("isNaN(1 ** Infinity)"),
    ]);
}

#[test]
fn modulo_takes_dividend_sign() {
    run_test_actions([
        TestAction::assert_eq("5 % 3", 2),
        TestAction::assert_eq("-5 % 3", -2),
        TestAction::assert_eq("5 % -3", 2),
    ]);
}

#[test]
fn bitwise_operators_use_int32() {
    run_test_actions([
        TestAction::assert_eq("0xFFFFFFFF | 0", -1),
        TestAction::assert_eq("1 << 31 >>> 0", 2_147_483_648_u32),
        TestAction::assert_eq("-1 >>> 0", 4_294_967_295_u32),
        TestAction::assert_eq("~5", -6),
        TestAction::assert_eq("'12' & 6", 4),
    ]);
}

#[test]
fn loose_equality_ladder() {
    run_test_actions([
        TestAction::assert("null == undefined"),
        TestAction::assert("null !== undefined"),
        TestAction::assert("1 == '1'"),
        TestAction::assert("true == 1"),
        TestAction::assert("'' == false"),
        TestAction::assert("null != 0"),
        TestAction::assert("NaN != NaN"),
    ]);
}

#[test]
fn strict_equality_compares_tags_first() {
    run_test_actions([
        TestAction::assert("1 !== '1'"),
        TestAction::assert("({}) !== ({})"),
        TestAction::assert("var o = {}; var p = o; o === p"),
    ]);
}

#[test]
fn relational_operators_compare_strings_by_code_point() {
    run_test_actions([
        TestAction::assert("'a' < 'b'"),
        TestAction::assert("'abc' < 'abd'"),
        TestAction::assert("'2' > '10'"),
        TestAction::assert("2 < 10"),
    ]);
}

#[test]
fn short_circuit_leaves_the_tested_operand() {
    run_test_actions([
        TestAction::assert_eq("0 || 'fallback'", "fallback"),
        TestAction::assert_eq("'first' || 'second'", "first"),
        TestAction::assert_eq("0 && 'never'", 0),
        TestAction::assert_eq("1 && 'second'", "second"),
        TestAction::assert_eq(
            "var calls = 0; function inc() { calls++; return true; } false && inc(); calls",
            0,
        ),
    ]);
}

#[test]
fn symbol_coercion_throws() {
    run_test_actions([
        TestAction::assert_native_error(
            "+Symbol();",
            JsNativeErrorKind::Type,
            "Cannot convert a Symbol value to a number",
        ),
        TestAction::assert_native_error(
            "'' + Symbol();",
            JsNativeErrorKind::Type,
            "Cannot convert a Symbol value to a string",
        ),
        TestAction::assert_native_error(
            "Symbol() < 0;",
            JsNativeErrorKind::Type,
            "Cannot convert a Symbol value to a number",
        ),
    ]);
}

#[test]
fn typeof_results() {
    run_test_actions([
        TestAction::assert_eq("typeof undefined", "undefined"),
        TestAction::assert_eq("typeof null", "object"),
        TestAction::assert_eq("typeof 1", "number"),
        TestAction::assert_eq("typeof 'x'", "string"),
        TestAction::assert_eq("typeof true", "boolean"),
        TestAction::assert_eq("typeof Symbol()", "symbol"),
        TestAction::assert_eq("typeof {}", "object"),
        TestAction::assert_eq("typeof function() {}", "function"),
    ]);
}

#[test]
fn instanceof_walks_the_prototype_chain() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function Animal() {}
            function Dog() {}
            Dog.prototype = Object.create(Animal.prototype);
            var rex = new Dog();
            (rex instanceof Dog) + ';' + (rex instanceof Animal) + ';' + (rex instanceof Date)
        "#},
        "true;true;false",
    )]);
}

#[test]
fn in_operator_requires_an_object() {
    run_test_actions([
        TestAction::assert("'a' in {a: 1}"),
        TestAction::assert("!('b' in {a: 1})"),
        TestAction::assert("0 in [10]"),
        TestAction::assert("'toString' in {}"),
        TestAction::assert_native_error(
            "'a' in 'abc';",
            JsNativeErrorKind::Type,
            "right-hand side of 'in' should be an object, got string",
        ),
    ]);
}

#[test]
fn update_operators_report_the_right_value() {
    run_test_actions([
        TestAction::assert_eq("var a = 1; a++", 1),
        TestAction::assert_eq("var b = 1; b++; b", 2),
        TestAction::assert_eq("var c = 1; ++c", 2),
        TestAction::assert_eq("var d = '5'; d++; d", 6),
        TestAction::assert_eq("var o = {n: 3}; o.n--; o.n", 2),
    ]);
}

#[test]
fn conditional_and_sequence() {
    run_test_actions([
        TestAction::assert_eq("true ? 'a' : 'b'", "a"),
        TestAction::assert_eq("(1, 2, 3)", 3),
    ]);
}

#[test]
fn compound_assignment() {
    run_test_actions([
        TestAction::assert_eq("var a = 5; a += 3; a", 8),
        TestAction::assert_eq("var b = 'x'; b += 1; b", "x1"),
        TestAction::assert_eq("var c = 8; c >>= 2; c", 2),
        TestAction::assert_eq("var d = 2; d **= 10; d", 1024),
    ]);
}

#[test]
fn exponentiation_is_right_associative() {
    run_test_actions([TestAction::assert_eq("2 ** 3 ** 2", 512)]);
}
